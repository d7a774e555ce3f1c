//! Cryptographic primitives for the cellar kernel.
//!
//! Wraps secp256k1 key agreement and Keccak-256 hashing with strong types.

use k256::elliptic_curve::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::CoreError;
use crate::types::{Key, KEY_SIZE};

/// Compute the Keccak-256 digest of the given data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A secp256k1 public key.
///
/// Identifies publishers and grantees. Encoded as 33-byte compressed
/// SEC1 at persistence and API boundaries.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// Parse from SEC1 bytes (compressed or uncompressed).
    ///
    /// Fails if the bytes do not encode a point on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CoreError::InvalidPeerKey)
    }

    /// Compressed SEC1 encoding (33 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub(crate) fn as_inner(&self) -> &k256::PublicKey {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

/// A secp256k1 secret key.
///
/// Only used for key agreement; the kernel never signs. The inner key
/// zeroizes itself on drop.
#[derive(Clone)]
pub struct SecretKey(k256::SecretKey);

impl SecretKey {
    /// Generate a new random secret key.
    pub fn random() -> Self {
        Self(k256::SecretKey::random(&mut rand::thread_rng()))
    }

    /// Create from a 32-byte scalar.
    ///
    /// Fails on zero or out-of-range scalars.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CoreError> {
        k256::SecretKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| CoreError::InvalidSecretKey)
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }

    /// Raw ECDH with a peer public key.
    ///
    /// Returns the x-coordinate of the shared point.
    pub fn shared_secret(&self, peer: &PublicKey) -> Key {
        let shared = diffie_hellman(self.0.to_nonzero_scalar(), peer.as_inner().as_affine());
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(shared.raw_secret_bytes());
        Key::from_bytes(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty_vector() {
        // Keccak-256 (legacy, pre-NIST padding) of the empty string.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_shared_secret_symmetric() {
        let alice = SecretKey::random();
        let bob = SecretKey::random();

        let ab = alice.shared_secret(&bob.public_key());
        let ba = bob.shared_secret(&alice.public_key());

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_public_key_sec1_roundtrip() {
        let secret = SecretKey::random();
        let public = secret.public_key();

        let recovered = PublicKey::from_sec1_bytes(&public.to_bytes()).unwrap();
        assert_eq!(public, recovered);
    }

    #[test]
    fn test_reject_off_curve_bytes() {
        // A compressed prefix followed by an x-coordinate with no square root.
        let mut bytes = vec![0x02];
        bytes.extend_from_slice(&[0xff; 32]);
        assert!(PublicKey::from_sec1_bytes(&bytes).is_err());
    }

    #[test]
    fn test_secret_key_deterministic_from_bytes() {
        let seed = [0x42u8; 32];
        let a = SecretKey::from_bytes(&seed).unwrap();
        let b = SecretKey::from_bytes(&seed).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_zero_scalar_rejected() {
        assert!(SecretKey::from_bytes(&[0u8; 32]).is_err());
    }
}
