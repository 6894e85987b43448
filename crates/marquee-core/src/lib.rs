//! Marquee Core - shared types and collaborator traits for the movie browser
//!
//! This crate defines the data model used throughout Marquee:
//! - `MovieSummary`: one catalog entry as listed in search results
//! - `SearchRequest` / `Fingerprint`: one page of one logical search
//! - `SearchViewState`: the snapshot the renderer consumes
//! - `FavoriteEntry`: a persisted favorite with its rendering snapshot
//!
//! plus the seams to the external collaborators (`CatalogClient`,
//! `FavoritesBackend`) and the error taxonomy shared across crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
