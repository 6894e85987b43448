//! The search session actor
//!
//! One tokio task owns all mutable state. UI events arrive through a command
//! channel; debounce firings, fetch completions, and favorite-write
//! completions are delivered through an internal channel into the same loop,
//! so staleness is checked at single-threaded delivery time and no locks are
//! needed. Superseded fetches are not cancelled at the transport; their late
//! completions simply fail the coordinator's generation check.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::{
    CatalogClient, CatalogError, CatalogPage, FavoriteEntry, FavoritesBackend, MovieId,
    MovieSummary, SearchStatus, SearchViewState, StorageError,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::coordinator::{FetchCoordinator, FetchTicket};
use crate::debounce::QueryDebouncer;
use crate::favorites::{Completion, FavoriteStore, WriteOp};
use crate::filter::compose_request;

/// Tunables for a search session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet interval before a typed query is dispatched
    pub debounce_quiet: Duration,

    /// Number of results requested per page
    pub page_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_quiet: Duration::from_secs(3),
            page_size: 10,
        }
    }
}

/// UI events driving the session
#[derive(Debug)]
enum Command {
    TextChanged(String),
    SearchCleared,
    FilterChanged {
        genre: Option<String>,
        min_rating: Option<f64>,
    },
    ScrollNearEnd,
    FavoriteTapped(MovieSummary),
    RetryTapped,
}

/// Completions delivered back into the serialized loop
enum Internal {
    QueryReady(String),
    PageLoaded {
        ticket: FetchTicket,
        result: Result<CatalogPage, CatalogError>,
    },
    FavoriteWritten {
        movie_id: MovieId,
        wrote_favorite: bool,
        result: Result<(), StorageError>,
    },
}

/// Transient notifications that never become part of the view state
#[derive(Debug, Clone)]
pub enum SessionNotice {
    /// A favorite toggle could not be persisted and was rolled back
    FavoriteSyncFailed { movie_id: MovieId, message: String },
}

/// Handle for driving a running session and observing its state
///
/// Dropping the handle tears the session down: the actor task is aborted, the
/// pending debounce timer dies with it, and late fetch completions land in a
/// closed channel.
pub struct SessionHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<SearchViewState>,
    favorites_rx: watch::Receiver<Vec<FavoriteEntry>>,
    notice_rx: Option<mpsc::UnboundedReceiver<SessionNotice>>,
    worker: JoinHandle<()>,
}

impl SessionHandle {
    /// Raw search-bar input; dispatch happens after the quiet interval
    pub fn on_text_changed(&self, raw: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::TextChanged(raw.into()));
    }

    /// The explicit "search cleared" path (cancel button, clear icon)
    pub fn on_search_cleared(&self) {
        let _ = self.cmd_tx.send(Command::SearchCleared);
    }

    /// Discrete filter selection; bypasses the debouncer
    pub fn on_filter_changed(&self, genre: Option<String>, min_rating: Option<f64>) {
        let _ = self.cmd_tx.send(Command::FilterChanged { genre, min_rating });
    }

    /// The list scrolled near its end
    pub fn on_scroll_near_end(&self) {
        let _ = self.cmd_tx.send(Command::ScrollNearEnd);
    }

    /// The favorite button on a cell was tapped
    pub fn on_favorite_tapped(&self, movie: MovieSummary) {
        let _ = self.cmd_tx.send(Command::FavoriteTapped(movie));
    }

    /// The retry button on the error state was tapped
    pub fn on_retry_tapped(&self) {
        let _ = self.cmd_tx.send(Command::RetryTapped);
    }

    /// Observable snapshot of the search screen
    pub fn view_state(&self) -> watch::Receiver<SearchViewState> {
        self.state_rx.clone()
    }

    /// Observable snapshot of the favorites screen
    pub fn favorites(&self) -> watch::Receiver<Vec<FavoriteEntry>> {
        self.favorites_rx.clone()
    }

    /// Take the stream of transient notices. Yields `Some` once.
    pub fn take_notices(&mut self) -> Option<mpsc::UnboundedReceiver<SessionNotice>> {
        self.notice_rx.take()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Factory for the session actor
pub struct SearchSession;

impl SearchSession {
    /// Spawn the session actor and return its handle.
    ///
    /// Persisted favorites are loaded before the first command is processed.
    pub fn spawn(
        catalog: Arc<dyn CatalogClient>,
        backend: Arc<dyn FavoritesBackend>,
        config: SessionConfig,
    ) -> SessionHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchViewState::default());
        let (favorites_tx, favorites_rx) = watch::channel(Vec::new());
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();

        let debouncer = {
            let tx = internal_tx.clone();
            QueryDebouncer::new(config.debounce_quiet, move |text| {
                let _ = tx.send(Internal::QueryReady(text));
            })
        };

        let coordinator = FetchCoordinator::new(config.page_size);
        let actor = Actor {
            catalog,
            backend,
            config,
            coordinator,
            favorites: FavoriteStore::new(),
            debouncer,
            debouncing: false,
            query: String::new(),
            genre: None,
            min_rating: None,
            internal_tx,
            state_tx,
            favorites_tx,
            notice_tx,
        };

        let worker = tokio::spawn(run(actor, cmd_rx, internal_rx));

        SessionHandle {
            cmd_tx,
            state_rx,
            favorites_rx,
            notice_rx: Some(notice_rx),
            worker,
        }
    }
}

struct Actor {
    catalog: Arc<dyn CatalogClient>,
    backend: Arc<dyn FavoritesBackend>,
    config: SessionConfig,
    coordinator: FetchCoordinator,
    favorites: FavoriteStore,
    debouncer: QueryDebouncer,
    /// True while typed input is waiting out the quiet interval
    debouncing: bool,
    query: String,
    genre: Option<String>,
    min_rating: Option<f64>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    state_tx: watch::Sender<SearchViewState>,
    favorites_tx: watch::Sender<Vec<FavoriteEntry>>,
    notice_tx: mpsc::UnboundedSender<SessionNotice>,
}

async fn run(
    mut actor: Actor,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    mut internal_rx: mpsc::UnboundedReceiver<Internal>,
) {
    info!("search session started");

    match actor.backend.load_all().await {
        Ok(entries) => actor.favorites.load(entries),
        Err(error) => warn!(%error, "failed to load persisted favorites"),
    }
    actor.publish_favorites();
    actor.publish();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => actor.handle_command(cmd),
                None => break,
            },
            event = internal_rx.recv() => match event {
                Some(event) => actor.handle_internal(event),
                None => break,
            },
        }
    }

    info!("search session stopped");
}

impl Actor {
    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::TextChanged(raw) => {
                // Empty input cancels the pending delivery, so no QueryReady
                // will arrive to clear the flag.
                self.debouncing = !raw.is_empty();
                self.debouncer.submit(raw);
                self.publish();
            }
            Command::SearchCleared => {
                // Cancel any pending debounced delivery, then back to idle.
                self.debouncer.submit(String::new());
                self.debouncing = false;
                self.query.clear();
                self.coordinator.reset();
                self.publish();
            }
            Command::FilterChanged { genre, min_rating } => {
                self.genre = genre;
                self.min_rating = min_rating;
                self.dispatch_search();
            }
            Command::ScrollNearEnd => {
                if let Some(ticket) = self.coordinator.load_next_page() {
                    self.spawn_fetch(ticket);
                    self.publish();
                }
            }
            Command::FavoriteTapped(movie) => self.toggle_favorite(movie),
            Command::RetryTapped => {
                if let Some(ticket) = self.coordinator.retry() {
                    self.spawn_fetch(ticket);
                    self.publish();
                }
            }
        }
    }

    fn handle_internal(&mut self, event: Internal) {
        match event {
            Internal::QueryReady(text) => {
                self.debouncing = false;
                self.query = text;
                self.dispatch_search();
            }
            Internal::PageLoaded { ticket, result } => {
                match result {
                    Ok(page) => self.coordinator.on_page(&ticket, page),
                    Err(error) => self.coordinator.on_error(&ticket, error.to_string()),
                }
                self.publish();
            }
            Internal::FavoriteWritten {
                movie_id,
                wrote_favorite,
                result,
            } => {
                let failure = result.as_ref().err().map(ToString::to_string);
                match self.favorites.on_write_complete(movie_id, wrote_favorite, result) {
                    Completion::Settled => {}
                    Completion::Dispatch(op) => self.spawn_write(movie_id, op),
                    Completion::RolledBack { movie_id, .. } => {
                        let message =
                            failure.unwrap_or_else(|| "favorite write failed".to_string());
                        let _ = self
                            .notice_tx
                            .send(SessionNotice::FavoriteSyncFailed { movie_id, message });
                        self.publish_favorites();
                        self.publish();
                    }
                }
            }
        }
    }

    /// Compose the current inputs and start a search if the fingerprint
    /// changed; the coordinator makes the unchanged case a no-op.
    fn dispatch_search(&mut self) {
        let request = compose_request(&self.query, self.genre.as_deref(), self.min_rating);
        if let Some(ticket) = self.coordinator.start(request) {
            self.spawn_fetch(ticket);
        }
        self.publish();
    }

    fn toggle_favorite(&mut self, movie: MovieSummary) {
        let movie_id = movie.id;
        let toggle = self.favorites.toggle(movie);
        debug!(%movie_id, favorite = toggle.now_favorite, "favorite toggled");
        if let Some(op) = toggle.dispatch {
            self.spawn_write(movie_id, op);
        }
        self.publish_favorites();
        self.publish();
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let catalog = Arc::clone(&self.catalog);
        let tx = self.internal_tx.clone();
        let limit = self.config.page_size;
        tokio::spawn(async move {
            debug!(page = ticket.request.page, "dispatching catalog fetch");
            let result = catalog.search(&ticket.request, limit).await;
            let _ = tx.send(Internal::PageLoaded { ticket, result });
        });
    }

    fn spawn_write(&self, movie_id: MovieId, op: WriteOp) {
        let backend = Arc::clone(&self.backend);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let wrote_favorite = op.target_state();
            let result = match op {
                WriteOp::Add(entry) => backend.add(&entry).await,
                WriteOp::Remove => backend.remove(movie_id).await,
            };
            let _ = tx.send(Internal::FavoriteWritten {
                movie_id,
                wrote_favorite,
                result,
            });
        });
    }

    fn publish(&self) {
        let status = if self.debouncing {
            SearchStatus::Debouncing
        } else {
            self.coordinator.status().clone()
        };
        let state = SearchViewState {
            items: self.coordinator.items().to_vec(),
            status,
            current_page: self.coordinator.current_page(),
            has_more: self.coordinator.has_more(),
            favorites: self.favorites.ids(),
        };
        let _ = self.state_tx.send(state);
    }

    fn publish_favorites(&self) {
        let _ = self.favorites_tx.send(self.favorites.entries());
    }
}
