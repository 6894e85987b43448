//! Marquee Store - durable favorites storage
//!
//! This crate provides the [`marquee_core::FavoritesBackend`] implementations:
//! - `LocalFavoritesStore`: a JSON file on disk
//! - `MemoryFavoritesStore`: in-memory, with injectable write failures for
//!   exercising rollback paths in tests

pub mod local;
pub mod memory;

pub use local::*;
pub use memory::*;
