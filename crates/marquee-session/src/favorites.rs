//! Optimistic favorites projection over a durable backend
//!
//! The projection answers membership queries synchronously and flips before
//! the durable write completes. Writes for one movie id strictly serialize:
//! while one runs, later toggles only update the desired end-state, and a
//! follow-up write is issued once the running one settles. A failed write
//! rolls the projection back to the last durable-confirmed state.

use std::collections::{HashMap, HashSet};

use marquee_core::{FavoriteEntry, MovieId, MovieSummary, StorageError};
use tracing::warn;

/// Durable write to dispatch for one movie id
#[derive(Debug, Clone)]
pub enum WriteOp {
    Add(FavoriteEntry),
    Remove,
}

impl WriteOp {
    /// Membership this write establishes when it succeeds
    pub fn target_state(&self) -> bool {
        matches!(self, WriteOp::Add(_))
    }
}

/// Result of a toggle: the state to render immediately, plus the durable
/// write to dispatch, if none is already running for this id
#[derive(Debug)]
pub struct Toggle {
    pub now_favorite: bool,
    pub dispatch: Option<WriteOp>,
}

/// Result of a settled durable write
#[derive(Debug)]
pub enum Completion {
    /// Durable state caught up with the projection
    Settled,
    /// A toggle superseded the write while it ran; dispatch this next
    Dispatch(WriteOp),
    /// The write failed; the projection was rolled back to the durable state
    RolledBack { movie_id: MovieId, now_favorite: bool },
}

#[derive(Debug)]
struct WriteQueue {
    /// Membership the backend last confirmed
    durable: bool,
    /// Membership the most recent toggle asked for
    desired: bool,
    /// Snapshot to write (or restore on rollback)
    snapshot: FavoriteEntry,
}

/// The in-memory favorites set with per-id write serialization
#[derive(Debug, Default)]
pub struct FavoriteStore {
    entries: HashMap<MovieId, FavoriteEntry>,
    writes: HashMap<MovieId, WriteQueue>,
}

impl FavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the projection from the persisted store. Loaded entries are
    /// durable by definition.
    pub fn load(&mut self, entries: Vec<FavoriteEntry>) {
        for entry in entries {
            self.entries.insert(entry.movie_id(), entry);
        }
    }

    /// Synchronous membership check for rendering
    pub fn is_favorite(&self, movie_id: MovieId) -> bool {
        self.entries.contains_key(&movie_id)
    }

    /// Current favorite ids, for overlaying onto search results
    pub fn ids(&self) -> HashSet<MovieId> {
        self.entries.keys().copied().collect()
    }

    /// Favorites ordered by when they were added, for the favorites screen
    pub fn entries(&self) -> Vec<FavoriteEntry> {
        let mut entries: Vec<FavoriteEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.added_at.cmp(&b.added_at).then(a.movie_id().cmp(&b.movie_id())));
        entries
    }

    /// Flip membership optimistically and report what to write durably.
    ///
    /// The returned state is final for rendering; the durable write catches
    /// up asynchronously via [`FavoriteStore::on_write_complete`].
    pub fn toggle(&mut self, movie: MovieSummary) -> Toggle {
        let movie_id = movie.id;
        let now_favorite = !self.is_favorite(movie_id);
        let entry = FavoriteEntry::new(movie);

        if now_favorite {
            self.entries.insert(movie_id, entry.clone());
        } else {
            self.entries.remove(&movie_id);
        }

        match self.writes.get_mut(&movie_id) {
            Some(queue) => {
                // A write is running; remember only the latest desired state.
                queue.desired = now_favorite;
                if now_favorite {
                    queue.snapshot = entry;
                }
                Toggle {
                    now_favorite,
                    dispatch: None,
                }
            }
            None => {
                // Nothing in flight, so the projection matched durable state
                // before this flip.
                self.writes.insert(
                    movie_id,
                    WriteQueue {
                        durable: !now_favorite,
                        desired: now_favorite,
                        snapshot: entry.clone(),
                    },
                );
                let op = if now_favorite {
                    WriteOp::Add(entry)
                } else {
                    WriteOp::Remove
                };
                Toggle {
                    now_favorite,
                    dispatch: Some(op),
                }
            }
        }
    }

    /// Fold in the result of a durable write for `movie_id`. `wrote_favorite`
    /// is the membership the completed write was establishing.
    pub fn on_write_complete(
        &mut self,
        movie_id: MovieId,
        wrote_favorite: bool,
        result: Result<(), StorageError>,
    ) -> Completion {
        let Some(mut queue) = self.writes.remove(&movie_id) else {
            // Late completion after a rollback already dropped the queue.
            return Completion::Settled;
        };

        match result {
            Ok(()) => {
                queue.durable = wrote_favorite;
                if queue.desired == queue.durable {
                    Completion::Settled
                } else {
                    let op = if queue.desired {
                        WriteOp::Add(queue.snapshot.clone())
                    } else {
                        WriteOp::Remove
                    };
                    self.writes.insert(movie_id, queue);
                    Completion::Dispatch(op)
                }
            }
            Err(error) => {
                warn!(%movie_id, %error, "favorite write failed, rolling back");
                let now_favorite = queue.durable;
                if now_favorite {
                    self.entries
                        .entry(movie_id)
                        .or_insert_with(|| queue.snapshot.clone());
                } else {
                    self.entries.remove(&movie_id);
                }
                Completion::RolledBack {
                    movie_id,
                    now_favorite,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64) -> MovieSummary {
        MovieSummary {
            id: MovieId(id),
            title: format!("movie {id}"),
            rating_value: None,
            duration_minutes: None,
            vote_count: None,
            genre_names: Vec::new(),
            poster_url: None,
            year: None,
        }
    }

    fn ok() -> Result<(), StorageError> {
        Ok(())
    }

    fn failed() -> Result<(), StorageError> {
        Err(StorageError::Backend("disk full".to_string()))
    }

    #[test]
    fn toggle_flips_immediately_and_dispatches_a_write() {
        let mut store = FavoriteStore::new();

        let toggle = store.toggle(movie(1));
        assert!(toggle.now_favorite);
        assert!(store.is_favorite(MovieId(1)));
        assert!(matches!(toggle.dispatch, Some(WriteOp::Add(_))));

        assert!(matches!(
            store.on_write_complete(MovieId(1), true, ok()),
            Completion::Settled
        ));

        let toggle = store.toggle(movie(1));
        assert!(!toggle.now_favorite);
        assert!(!store.is_favorite(MovieId(1)));
        assert!(matches!(toggle.dispatch, Some(WriteOp::Remove)));
    }

    #[test]
    fn second_toggle_waits_for_the_running_write() {
        let mut store = FavoriteStore::new();

        let first = store.toggle(movie(1));
        assert!(first.dispatch.is_some());

        // The add is still in flight; toggling off must not dispatch yet.
        let second = store.toggle(movie(1));
        assert!(!second.now_favorite);
        assert!(second.dispatch.is_none());

        // Add settles; the queued removal is issued next.
        match store.on_write_complete(MovieId(1), true, ok()) {
            Completion::Dispatch(WriteOp::Remove) => {}
            other => panic!("expected queued removal, got {other:?}"),
        }

        assert!(matches!(
            store.on_write_complete(MovieId(1), false, ok()),
            Completion::Settled
        ));
        assert!(!store.is_favorite(MovieId(1)));
    }

    #[test]
    fn rapid_toggles_settle_on_the_last_requested_state() {
        let mut store = FavoriteStore::new();

        store.toggle(movie(1)); // on, dispatched
        store.toggle(movie(1)); // off, queued
        store.toggle(movie(1)); // on again, supersedes the queued off

        assert!(store.is_favorite(MovieId(1)));
        // The add that completes already matches the desired state.
        assert!(matches!(
            store.on_write_complete(MovieId(1), true, ok()),
            Completion::Settled
        ));
        assert!(store.is_favorite(MovieId(1)));
    }

    #[test]
    fn failed_add_rolls_back_to_not_favorite() {
        let mut store = FavoriteStore::new();

        let toggle = store.toggle(movie(1));
        assert!(toggle.now_favorite);

        match store.on_write_complete(MovieId(1), true, failed()) {
            Completion::RolledBack {
                movie_id,
                now_favorite,
            } => {
                assert_eq!(movie_id, MovieId(1));
                assert!(!now_favorite);
            }
            other => panic!("expected rollback, got {other:?}"),
        }
        assert!(!store.is_favorite(MovieId(1)));
    }

    #[test]
    fn failed_remove_restores_the_entry() {
        let mut store = FavoriteStore::new();
        store.load(vec![FavoriteEntry::new(movie(1))]);

        let toggle = store.toggle(movie(1));
        assert!(!toggle.now_favorite);
        assert!(!store.is_favorite(MovieId(1)));

        match store.on_write_complete(MovieId(1), false, failed()) {
            Completion::RolledBack { now_favorite, .. } => assert!(now_favorite),
            other => panic!("expected rollback, got {other:?}"),
        }
        assert!(store.is_favorite(MovieId(1)));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn different_ids_write_independently() {
        let mut store = FavoriteStore::new();

        let first = store.toggle(movie(1));
        let second = store.toggle(movie(2));
        assert!(first.dispatch.is_some());
        assert!(second.dispatch.is_some());

        assert!(matches!(
            store.on_write_complete(MovieId(2), true, ok()),
            Completion::Settled
        ));
        assert!(matches!(
            store.on_write_complete(MovieId(1), true, ok()),
            Completion::Settled
        ));
    }

    #[test]
    fn load_never_duplicates_ids() {
        let mut store = FavoriteStore::new();
        store.load(vec![FavoriteEntry::new(movie(1)), FavoriteEntry::new(movie(1))]);
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn entries_are_ordered_by_added_at() {
        let mut store = FavoriteStore::new();
        let mut early = FavoriteEntry::new(movie(2));
        early.added_at -= chrono::Duration::hours(1);
        store.load(vec![early]);
        store.toggle(movie(1));

        let order: Vec<i64> = store.entries().iter().map(|e| e.movie_id().0).collect();
        assert_eq!(order, vec![2, 1]);
    }
}
