//! Error types for marquee-core

use thiserror::Error;

/// Failures talking to the remote movie catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed catalog response: {0}")]
    Decode(String),
}

/// Failures persisting or loading favorites.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}
