//! In-memory favorites backend

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use marquee_core::{FavoriteEntry, FavoritesBackend, MovieId, StorageError};

/// Favorites held in memory only
///
/// Used by tests and by embedders that do not want disk persistence. Writes
/// can be made to fail on demand to exercise optimistic-rollback paths.
#[derive(Default)]
pub struct MemoryFavoritesStore {
    entries: Mutex<HashMap<MovieId, FavoriteEntry>>,
    fail_writes: AtomicBool,
}

impl MemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `add`/`remove` calls fail with a backend error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored favorites
    pub fn len(&self) -> usize {
        self.entries.lock().expect("favorites lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Backend("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FavoritesBackend for MemoryFavoritesStore {
    async fn add(&self, entry: &FavoriteEntry) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries
            .lock()
            .expect("favorites lock poisoned")
            .insert(entry.movie_id(), entry.clone());
        Ok(())
    }

    async fn remove(&self, movie_id: MovieId) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries
            .lock()
            .expect("favorites lock poisoned")
            .remove(&movie_id);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<FavoriteEntry>, StorageError> {
        Ok(self
            .entries
            .lock()
            .expect("favorites lock poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::MovieSummary;

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

    #[tokio::test]
    async fn add_remove_load() {
        let store = MemoryFavoritesStore::new();
        store.add(&FavoriteEntry::new(movie(1))).await.unwrap();
        store.add(&FavoriteEntry::new(movie(2))).await.unwrap();
        store.remove(MovieId(1)).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].movie_id(), MovieId(2));
    }

    #[tokio::test]
    async fn injected_failures_reject_writes_but_not_reads() {
        let store = MemoryFavoritesStore::new();
        store.add(&FavoriteEntry::new(movie(1))).await.unwrap();

        store.set_fail_writes(true);
        assert!(store.add(&FavoriteEntry::new(movie(2))).await.is_err());
        assert!(store.remove(MovieId(1)).await.is_err());
        assert_eq!(store.load_all().await.unwrap().len(), 1);

        store.set_fail_writes(false);
        store.remove(MovieId(1)).await.unwrap();
        assert!(store.is_empty());
    }
}
