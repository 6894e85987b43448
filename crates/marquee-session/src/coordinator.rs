//! Pagination state machine for catalog fetches
//!
//! The coordinator is synchronous: it decides *what* to fetch and folds
//! completions back in, while the session owns the async plumbing. Every
//! issued fetch carries a [`FetchTicket`]; a completion whose ticket no
//! longer matches the coordinator's generation and in-flight page is stale
//! and silently discarded.

use std::collections::HashSet;

use marquee_core::{CatalogPage, Fingerprint, MovieId, MovieSummary, SearchRequest, SearchStatus};
use tracing::debug;

/// A fetch the session should dispatch, tagged with the generation that must
/// still be current when the response comes back.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub request: SearchRequest,
    pub generation: u64,
}

/// Owns accumulated results and pagination state for one logical search at a
/// time, enforcing one in-flight fetch per fingerprint.
#[derive(Debug)]
pub struct FetchCoordinator {
    page_size: usize,
    fingerprint: Option<Fingerprint>,
    /// Bumped whenever the logical search changes; stale tickets never match.
    generation: u64,
    status: SearchStatus,
    items: Vec<MovieSummary>,
    seen: HashSet<MovieId>,
    current_page: u32,
    has_more: bool,
    /// Page number of the outstanding fetch, if any.
    in_flight: Option<u32>,
    /// The most recent fetch attempt, kept verbatim for retry.
    last_attempt: Option<SearchRequest>,
}

impl FetchCoordinator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            fingerprint: None,
            generation: 0,
            status: SearchStatus::Idle,
            items: Vec::new(),
            seen: HashSet::new(),
            current_page: 0,
            has_more: false,
            in_flight: None,
            last_attempt: None,
        }
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Begin a logical search.
    ///
    /// A request with a new fingerprint abandons whatever is in flight (its
    /// eventual completion fails the generation check) and starts over at
    /// page 1. A request matching the current fingerprint is a no-op while
    /// that search is loading or loaded; from `Idle` or `Error` it starts
    /// fresh.
    pub fn start(&mut self, request: SearchRequest) -> Option<FetchTicket> {
        let fingerprint = request.fingerprint();
        if self.fingerprint.as_ref() == Some(&fingerprint)
            && matches!(
                self.status,
                SearchStatus::Loading | SearchStatus::LoadingMore | SearchStatus::Loaded
            )
        {
            return None;
        }

        self.generation += 1;
        self.fingerprint = Some(fingerprint);
        self.items.clear();
        self.seen.clear();
        self.current_page = 0;
        self.has_more = false;
        self.status = SearchStatus::Loading;

        let request = SearchRequest { page: 1, ..request };
        self.in_flight = Some(1);
        self.last_attempt = Some(request.clone());
        Some(FetchTicket {
            request,
            generation: self.generation,
        })
    }

    /// Request the page after the last loaded one. No-op unless the current
    /// search is `Loaded` with more pages available.
    pub fn load_next_page(&mut self) -> Option<FetchTicket> {
        if self.status != SearchStatus::Loaded || !self.has_more {
            return None;
        }
        let request = SearchRequest {
            page: self.current_page + 1,
            ..self.last_attempt.clone()?
        };
        self.status = SearchStatus::LoadingMore;
        self.in_flight = Some(request.page);
        self.last_attempt = Some(request.clone());
        Some(FetchTicket {
            request,
            generation: self.generation,
        })
    }

    /// Re-issue the fetch that failed, verbatim. Valid only from `Error`.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if !matches!(self.status, SearchStatus::Error(_)) {
            return None;
        }
        let request = self.last_attempt.clone()?;
        self.status = if self.current_page == 0 {
            SearchStatus::Loading
        } else {
            SearchStatus::LoadingMore
        };
        self.in_flight = Some(request.page);
        Some(FetchTicket {
            request,
            generation: self.generation,
        })
    }

    /// Forget the current search entirely (search cleared). Late completions
    /// from before the reset are discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.fingerprint = None;
        self.items.clear();
        self.seen.clear();
        self.current_page = 0;
        self.has_more = false;
        self.in_flight = None;
        self.last_attempt = None;
        self.status = SearchStatus::Idle;
    }

    fn is_stale(&self, ticket: &FetchTicket) -> bool {
        ticket.generation != self.generation || self.in_flight != Some(ticket.request.page)
    }

    /// Merge a successful page into the accumulated results.
    pub fn on_page(&mut self, ticket: &FetchTicket, page: CatalogPage) {
        if self.is_stale(ticket) {
            debug!(page = ticket.request.page, "discarding stale catalog response");
            return;
        }

        let fetched = page.movies.len();
        for movie in page.movies {
            if self.seen.insert(movie.id) {
                self.items.push(movie);
            }
        }
        self.current_page = ticket.request.page;
        self.has_more = fetched >= self.page_size;
        self.in_flight = None;
        self.status = SearchStatus::Loaded;
    }

    /// Record a failed fetch. Accumulated items and the current page are left
    /// untouched so a retry can resume cleanly.
    pub fn on_error(&mut self, ticket: &FetchTicket, message: String) {
        if self.is_stale(ticket) {
            debug!(page = ticket.request.page, "discarding stale catalog failure");
            return;
        }
        self.in_flight = None;
        self.status = SearchStatus::Error(message);
    }
}
