//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key or chunk is absent.
    #[error("not found")]
    NotFound,

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Underlying load/save failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed persisted payload.
    #[error("codec error: {0}")]
    Codec(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
