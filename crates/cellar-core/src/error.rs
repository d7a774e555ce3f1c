//! Error types for the cellar core.

use thiserror::Error;

/// Errors produced by the core cryptographic primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The peer public key is not a valid point on secp256k1.
    #[error("invalid peer public key")]
    InvalidPeerKey,

    /// A secret key could not be constructed from the given bytes.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// Decryption produced a payload of the wrong shape.
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// A reference could not be parsed.
    #[error("malformed reference: {0}")]
    MalformedReference(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
