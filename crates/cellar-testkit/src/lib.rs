//! # Cellar Testkit
//!
//! Testing utilities for the cellar access control kernel.
//!
//! - **Fixtures**: deterministic key pairs plus shared in-memory storage
//!   for multi-party scenarios
//! - **Generators**: proptest strategies over the core types
//! - **Golden vectors**: fixed inputs with pinned expected outputs for the
//!   digest, cipher and session primitives

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture, PUBLISHER_SEED_HEX, REFERENCE_HEX};
pub use vectors::{
    cipher_vectors, digest_vectors, public_key_vectors, session_vectors, CipherVector,
    DigestVector, PublicKeyVector, SessionVector,
};
