//! # Cellar Core
//!
//! Core types and cryptographic primitives for the cellar access
//! control kernel.
//!
//! ## Core Types
//!
//! - [`Reference`] - A 32-byte content address (zero = absent)
//! - [`Key`] - A 32-byte symmetric key, zeroed on drop
//! - [`PublicKey`] / [`SecretKey`] - secp256k1 identities
//!
//! ## Primitives
//!
//! - [`KeystreamCipher`] - deterministic, length-preserving reference cipher
//! - [`Session`] - per-peer key derivation via ECDH + Keccak-256

pub mod cipher;
pub mod crypto;
pub mod error;
pub mod session;
pub mod types;

pub use cipher::KeystreamCipher;
pub use crypto::{keccak256, PublicKey, SecretKey};
pub use error::{CoreError, Result};
pub use session::{SecretKeySession, Session, DECRYPT_NONCE, LOOKUP_NONCE};
pub use types::{Key, Reference, KEY_SIZE, REFERENCE_SIZE};
