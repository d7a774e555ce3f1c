//! SQLite implementation of the chunk store traits.
//!
//! A local chunk cache for nodes that keep access control state on disk.
//! Uses rusqlite with bundled SQLite behind a mutex, following the same
//! connection discipline as the in-memory backend's lock.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use cellar_core::Reference;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Loader, Saver};

/// SQLite-backed content-addressed storage.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open a database at the given path, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(format!("mutex poisoned: {e}")))?;
        f(&conn)
    }
}

#[async_trait]
impl Loader for SqliteStorage {
    async fn load(&self, reference: &Reference) -> Result<Bytes> {
        self.with_conn(|conn| {
            let payload: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT payload FROM chunks WHERE reference = ?1",
                    params![reference.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            payload.map(Bytes::from).ok_or(StoreError::NotFound)
        })
    }
}

#[async_trait]
impl Saver for SqliteStorage {
    async fn save(&self, data: Bytes) -> Result<Reference> {
        let reference = Reference::from_bytes(*blake3::hash(&data).as_bytes());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO chunks (reference, payload) VALUES (?1, ?2)",
                params![reference.as_bytes().as_slice(), data.as_ref()],
            )?;
            Ok(())
        })?;
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let storage = SqliteStorage::open_memory().unwrap();
        let reference = storage.save(Bytes::from_static(b"payload")).await.unwrap();

        let loaded = storage.load(&reference).await.unwrap();
        assert_eq!(loaded, Bytes::from_static(b"payload"));
    }

    #[tokio::test]
    async fn test_missing_chunk_not_found() {
        let storage = SqliteStorage::open_memory().unwrap();
        let absent = Reference::from_bytes([0x55; 32]);
        assert!(matches!(
            storage.load(&absent).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_save_is_idempotent() {
        let storage = SqliteStorage::open_memory().unwrap();
        let a = storage.save(Bytes::from_static(b"dup")).await.unwrap();
        let b = storage.save(Bytes::from_static(b"dup")).await.unwrap();
        assert_eq!(a, b);
    }
}
