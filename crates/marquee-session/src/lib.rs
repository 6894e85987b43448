//! Marquee Session - the incremental search and favorites engine
//!
//! This crate composes the browsing core:
//! - `QueryDebouncer`: coalesces keystrokes into one query per quiet period
//! - `compose_request`: merges query/genre/rating into a canonical request
//! - `FetchCoordinator`: the pagination state machine with staleness checks
//! - `FavoriteStore`: optimistic favorites with per-id serialized writes
//! - `SearchSession`: the actor wiring everything into one serialized loop
//!
//! UI events enter through a [`SessionHandle`]; the latest render snapshot is
//! observable through a `watch` channel.

pub mod coordinator;
pub mod debounce;
pub mod favorites;
pub mod filter;
pub mod session;

pub use coordinator::*;
pub use debounce::*;
pub use favorites::*;
pub use filter::*;
pub use session::*;
