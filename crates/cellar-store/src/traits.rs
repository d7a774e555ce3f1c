//! Capability traits for the content-addressed chunk store.
//!
//! The access control structures are parameterised over these two small
//! interfaces; the chunk store itself lives outside this workspace.

use async_trait::async_trait;
use bytes::Bytes;

use cellar_core::Reference;

use crate::error::Result;

/// Read access to the content-addressed store.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Load the chunk addressed by `reference`.
    ///
    /// Fails with `NotFound` when no such chunk exists.
    async fn load(&self, reference: &Reference) -> Result<Bytes>;
}

/// Write access to the content-addressed store.
#[async_trait]
pub trait Saver: Send + Sync {
    /// Persist `data` and return its content address.
    async fn save(&self, data: Bytes) -> Result<Reference>;
}

/// Combined read/write access.
pub trait LoadSaver: Loader + Saver {}

impl<T: Loader + Saver> LoadSaver for T {}
