//! Marquee Catalog - HTTP client for the remote movie catalog
//!
//! Implements [`marquee_core::CatalogClient`] against a kinopoisk-style REST
//! API: search parameters go out as query-string pairs, results come back as
//! a `docs` envelope that is mapped leniently into `MovieSummary` values.

pub mod client;
mod dto;

pub use client::*;
