//! # Cellar ACT
//!
//! The access control trie subsystem: the key protocol over a persisted
//! manifest, the grantee list, and the time-indexed history of manifest
//! roots.
//!
//! ## Key Concepts
//!
//! - **Access key**: a symmetric key minted per publication, encrypting
//!   every reference published under one manifest
//! - **Lookup / decryption key pair**: derived per member from the shared
//!   secret with the publisher; the lookup key addresses the member's
//!   manifest entry, the decryption key unwraps the access key inside it
//! - **History**: reverse-chronological index resolving "the manifest in
//!   force at instant t"

pub mod error;
pub mod grantee;
pub mod history;
pub mod logic;

pub use error::{AccessError, Result};
pub use grantee::GranteeList;
pub use history::{History, HistoryEntry};
pub use logic::AccessLogic;
