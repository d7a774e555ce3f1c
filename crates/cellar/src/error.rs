//! Error types for the controller.

use thiserror::Error;

use cellar_act::AccessError;
use cellar_core::CoreError;
use cellar_store::StoreError;

/// Errors surfaced by controller operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The history holds no entry applicable to the requested instant.
    #[error("no applicable access control manifest for the requested instant")]
    Expired,

    /// Access control failure.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cryptographic failure.
    #[error(transparent)]
    Crypto(#[from] CoreError),
}

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, Error>;
