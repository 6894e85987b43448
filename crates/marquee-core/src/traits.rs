//! Collaborator seams
//!
//! The browsing core talks to the outside world only through these traits.
//! Implementations are injected at session construction, which keeps the
//! engine testable with scripted fakes and avoids process-wide singletons.

use async_trait::async_trait;

use crate::error::{CatalogError, StorageError};
use crate::types::{CatalogPage, FavoriteEntry, MovieId, SearchRequest};

/// The remote movie catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of results for a search request, asking for at most
    /// `limit` movies.
    async fn search(&self, request: &SearchRequest, limit: usize) -> Result<CatalogPage, CatalogError>;
}

/// Durable storage for favorited movies.
///
/// Callers serialize writes per movie id; implementations only need to make
/// each individual operation atomic.
#[async_trait]
pub trait FavoritesBackend: Send + Sync {
    /// Persist a favorite, replacing any existing entry for the same movie.
    async fn add(&self, entry: &FavoriteEntry) -> Result<(), StorageError>;

    /// Remove the favorite for a movie, if present.
    async fn remove(&self, movie_id: MovieId) -> Result<(), StorageError>;

    /// Load every persisted favorite.
    async fn load_all(&self) -> Result<Vec<FavoriteEntry>, StorageError>;
}
