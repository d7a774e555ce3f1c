//! Error types for the access control module.

use thiserror::Error;

use cellar_core::CoreError;
use cellar_store::StoreError;

/// Errors that can occur during access control operations.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The caller has no entry in the access control manifest.
    #[error("not granted")]
    NotGranted,

    /// The access control manifest has no publisher entry.
    #[error("no publisher entry")]
    NoPublisher,

    /// A ciphertext decrypted into a payload of the wrong shape.
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// A lookup timestamp was not strictly positive.
    #[error("invalid timestamp")]
    InvalidTimestamp,

    /// Malformed persisted payload.
    #[error("codec error: {0}")]
    Codec(String),

    /// Cryptographic failure from the core primitives.
    #[error(transparent)]
    Crypto(#[from] CoreError),

    /// Underlying storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for access control operations.
pub type Result<T> = std::result::Result<T, AccessError>;
