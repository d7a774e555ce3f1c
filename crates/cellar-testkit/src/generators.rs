//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cellar_core::{Key, PublicKey, Reference, SecretKey};

/// Generate a random reference.
pub fn reference() -> impl Strategy<Value = Reference> {
    any::<[u8; 32]>().prop_map(Reference::from_bytes)
}

/// Generate a non-zero reference.
pub fn non_zero_reference() -> impl Strategy<Value = Reference> {
    reference().prop_filter("zero is the absent sentinel", |r| !r.is_zero())
}

/// Generate a random symmetric key.
pub fn key() -> impl Strategy<Value = Key> {
    any::<[u8; 32]>().prop_map(Key::from_bytes)
}

/// Generate a random secret key.
pub fn secret_key() -> impl Strategy<Value = SecretKey> {
    any::<[u8; 32]>().prop_filter_map("scalar must be valid", |seed| {
        SecretKey::from_bytes(&seed).ok()
    })
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    secret_key().prop_map(|secret| secret.public_key())
}

/// Generate a lookup-valid (strictly positive) timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    1i64..=i64::MAX / 2
}

/// Generate payload bytes of at most `max_len`.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}
