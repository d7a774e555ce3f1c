//! In-memory implementation of the chunk store traits.
//!
//! This is primarily for testing. Chunks are addressed by the blake3
//! digest of their payload and kept in a map behind an RwLock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use cellar_core::Reference;

use crate::error::{Result, StoreError};
use crate::traits::{Loader, Saver};

/// In-memory content-addressed storage.
///
/// Cloning is cheap; clones share the same chunk map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    chunks: Arc<RwLock<HashMap<Reference, Bytes>>>,
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.chunks.read().map(|chunks| chunks.len()).unwrap_or(0)
    }

    /// Whether the storage holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Loader for MemoryStorage {
    async fn load(&self, reference: &Reference) -> Result<Bytes> {
        let chunks = self
            .chunks
            .read()
            .map_err(|e| StoreError::Storage(format!("lock poisoned: {e}")))?;
        chunks.get(reference).cloned().ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl Saver for MemoryStorage {
    async fn save(&self, data: Bytes) -> Result<Reference> {
        let reference = Reference::from_bytes(*blake3::hash(&data).as_bytes());
        let mut chunks = self
            .chunks
            .write()
            .map_err(|e| StoreError::Storage(format!("lock poisoned: {e}")))?;
        chunks.insert(reference, data);
        Ok(reference)
    }
}
