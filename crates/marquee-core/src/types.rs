//! Domain types - the data model of the movie browsing core

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Unique identifier for a movie in the remote catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovieId(pub i64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog entry as listed in a search result page
///
/// Identity is `id`: two summaries with equal `id` are the same movie even if
/// other fields differ across pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog identifier for this movie
    pub id: MovieId,

    /// Display title
    pub title: String,

    /// Aggregate rating, when the catalog has one
    pub rating_value: Option<f64>,

    /// Runtime in minutes
    pub duration_minutes: Option<u32>,

    /// Number of votes behind the rating
    pub vote_count: Option<u64>,

    /// Genre names in catalog order
    pub genre_names: Vec<String>,

    /// Poster image location
    pub poster_url: Option<Url>,

    /// Release year
    pub year: Option<i32>,
}

/// One page of one logical search
///
/// Immutable once constructed. Two requests belong to the same logical search
/// iff their [`Fingerprint`]s match; `page` advances within a search and is
/// excluded from the fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Free-text query (may be empty for unfiltered browsing)
    pub query: String,

    /// Genre filter (None = all genres)
    pub genre: Option<String>,

    /// Minimum aggregate rating (None = no threshold)
    pub min_rating: Option<f64>,

    /// 1-based page number
    pub page: u32,
}

impl SearchRequest {
    /// The identity of the logical search this request belongs to
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            query: self.query.clone(),
            genre: self.genre.clone(),
            min_rating_bits: self.min_rating.map(f64::to_bits),
        }
    }

    /// The same logical search, one page further
    pub fn next_page(&self) -> SearchRequest {
        SearchRequest {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// Identity of one logical search: the (query, genre, min_rating) triple,
/// independent of page.
///
/// Ratings are compared bitwise so the fingerprint can be `Eq`/`Hash`; rating
/// selections are discrete UI steps, so this matches value equality in
/// practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    query: String,
    genre: Option<String>,
    min_rating_bits: Option<u64>,
}

/// What the search screen is currently doing. Exactly one status holds at a
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// No search active
    #[default]
    Idle,

    /// Typed input is waiting out the quiet interval
    Debouncing,

    /// First page of a search is in flight
    Loading,

    /// A follow-up page is in flight
    LoadingMore,

    /// Last fetch succeeded
    Loaded,

    /// Last fetch failed; recoverable via retry
    Error(String),
}

/// Snapshot of the search screen for the renderer
///
/// `items` keeps page-arrival order with duplicates by id removed (first
/// occurrence wins). `favorites` is the overlay the renderer uses to mark
/// each item; favorite status is never stored inside `MovieSummary`.
#[derive(Debug, Clone)]
pub struct SearchViewState {
    pub items: Vec<MovieSummary>,
    pub status: SearchStatus,
    pub current_page: u32,
    pub has_more: bool,
    pub favorites: HashSet<MovieId>,
}

impl Default for SearchViewState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: SearchStatus::Idle,
            current_page: 0,
            has_more: false,
            favorites: HashSet::new(),
        }
    }
}

/// A persisted favorite
///
/// The full `MovieSummary` snapshot is stored so the favorites screen renders
/// without a live catalog fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Snapshot of the movie at the time it was favorited
    pub movie: MovieSummary,

    /// When the favorite was added
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Snapshot a movie as a favorite added now
    pub fn new(movie: MovieSummary) -> Self {
        Self {
            movie,
            added_at: Utc::now(),
        }
    }

    /// Identity of the favorited movie
    pub fn movie_id(&self) -> MovieId {
        self.movie.id
    }
}

/// One successful page of catalog results
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// Movies in catalog order
    pub movies: Vec<MovieSummary>,

    /// Total match count, when the catalog reports one
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str, genre: Option<&str>, min_rating: Option<f64>, page: u32) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            genre: genre.map(String::from),
            min_rating,
            page,
        }
    }

    #[test]
    fn fingerprint_ignores_page() {
        let page1 = request("Luck", Some("drama"), Some(7.0), 1);
        let page5 = request("Luck", Some("drama"), Some(7.0), 5);
        assert_eq!(page1.fingerprint(), page5.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_each_filter() {
        let base = request("Luck", None, None, 1);
        assert_ne!(base.fingerprint(), request("Lucky", None, None, 1).fingerprint());
        assert_ne!(base.fingerprint(), request("Luck", Some("drama"), None, 1).fingerprint());
        assert_ne!(base.fingerprint(), request("Luck", None, Some(5.0), 1).fingerprint());
    }

    #[test]
    fn next_page_advances_within_the_same_search() {
        let first = request("Luck", None, None, 1);
        let second = first.next_page();
        assert_eq!(second.page, 2);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }
}
