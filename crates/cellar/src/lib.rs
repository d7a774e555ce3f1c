//! # Cellar
//!
//! Dynamic access control kernel for a content-addressed storage node.
//!
//! A publisher encrypts content references under a per-publication access
//! key. Each authorized grantee, identified by a secp256k1 public key,
//! derives from their own secret key and the publisher's public key the
//! pair of keys that lets them find and unwrap the access key inside a
//! published access control manifest.
//!
//! ## Core Invariants
//!
//! 1. **Content-addressable**: every persisted structure is an immutable
//!    DAG rooted at a single reference
//! 2. **Append-only history**: publications never rewrite published roots
//! 3. **Re-keying on revocation**: removing a grantee always rotates the
//!    access key
//! 4. **Fail-closed grantee list**: only the publisher can resolve the
//!    published list reference
//!
//! ## Example
//!
//! ```no_run
//! use cellar::{Controller, Reference, SecretKey, SecretKeySession};
//! use cellar_store::MemoryStorage;
//!
//! # async fn run() -> cellar::Result<()> {
//! let secret = SecretKey::random();
//! let publisher = secret.public_key();
//! let controller = Controller::new(SecretKeySession::new(secret), MemoryStorage::new());
//!
//! let reference = Reference::from_bytes([0x2a; 32]);
//! let upload = controller.upload(&reference, &publisher, &Reference::ZERO).await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;

pub use controller::{
    Controller, ControllerConfig, GranteeUpdate, UploadResult, ENCRYPTED_GL_REF_KEY,
};
pub use error::{Error, Result};

pub use cellar_act::{AccessError, AccessLogic, GranteeList, History, HistoryEntry};
pub use cellar_core::{
    Key, KeystreamCipher, PublicKey, Reference, SecretKey, SecretKeySession, Session,
};
pub use cellar_store::{
    KvStore, LoadSaver, Loader, MemoryStorage, Saver, SqliteStorage, StoreError,
};
