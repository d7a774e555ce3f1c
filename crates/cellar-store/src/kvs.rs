//! Key-value store over the content-addressed manifest.
//!
//! The persisted mapping behind an access control manifest: opaque byte
//! keys to opaque byte values, addressable by a single root reference.
//! Two stores loaded from the same root are observationally equal.

use cellar_core::Reference;

use crate::error::{Result, StoreError};
use crate::manifest::{Entry, Manifest};
use crate::traits::LoadSaver;

/// A persistable key-value store.
pub struct KvStore<LS> {
    manifest: Manifest<LS>,
}

impl<LS: LoadSaver> KvStore<LS> {
    /// Create an empty store.
    pub fn new(ls: LS) -> Self {
        Self {
            manifest: Manifest::new(ls),
        }
    }

    /// Open a store from its root reference.
    pub async fn load(ls: LS, reference: Reference) -> Result<Self> {
        Ok(Self {
            manifest: Manifest::load(ls, reference).await?,
        })
    }

    /// Store a value under a key, replacing any previous value.
    pub async fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.manifest.insert(key, Entry::new(value)).await
    }

    /// Fetch the value under a key.
    ///
    /// Fails with `NotFound` when the key is absent.
    pub async fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        match self.manifest.get(key).await? {
            Some(entry) => Ok(entry.value),
            None => Err(StoreError::NotFound),
        }
    }

    /// Persist the store and return its root reference.
    pub async fn save(&mut self) -> Result<Reference> {
        self.manifest.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;

    #[tokio::test]
    async fn test_put_get() {
        let mut store = KvStore::new(MemoryStorage::new());
        store.put(b"key", b"value".to_vec()).await.unwrap();
        assert_eq!(store.get(b"key").await.unwrap(), b"value");
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let mut store = KvStore::new(MemoryStorage::new());
        assert!(matches!(
            store.get(b"missing").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_save_load_equal() {
        let storage = MemoryStorage::new();

        let mut store = KvStore::new(storage.clone());
        store.put(b"a", b"1".to_vec()).await.unwrap();
        store.put(b"b", b"2".to_vec()).await.unwrap();
        let reference = store.save().await.unwrap();

        let mut first = KvStore::load(storage.clone(), reference).await.unwrap();
        let mut second = KvStore::load(storage, reference).await.unwrap();
        assert_eq!(first.get(b"a").await.unwrap(), b"1");
        assert_eq!(second.get(b"a").await.unwrap(), b"1");
        assert_eq!(first.get(b"b").await.unwrap(), b"2");
        assert_eq!(second.get(b"b").await.unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_put_after_save_creates_new_version() {
        let storage = MemoryStorage::new();

        let mut store = KvStore::new(storage.clone());
        store.put(b"a", b"1".to_vec()).await.unwrap();
        let first = store.save().await.unwrap();

        store.put(b"a", b"2".to_vec()).await.unwrap();
        let second = store.save().await.unwrap();
        assert_ne!(first, second);

        // The earlier version is still intact.
        let mut old = KvStore::load(storage, first).await.unwrap();
        assert_eq!(old.get(b"a").await.unwrap(), b"1");
    }

    #[tokio::test]
    async fn test_binary_keys() {
        let mut store = KvStore::new(MemoryStorage::new());
        let key = [0x00, 0xff, 0x10, 0x20];
        store.put(&key, b"binary".to_vec()).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), b"binary");
    }
}
