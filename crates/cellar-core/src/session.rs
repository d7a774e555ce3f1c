//! Session key derivation via secp256k1 key agreement.
//!
//! A session binds a held secret key to a peer public key: for each nonce
//! `n` it derives `Keccak256(ECDH_x(self, peer) || n)`. The access logic
//! passes nonces `{0x00, 0x01}` to obtain the lookup key and the
//! key-decryption key for one ACT entry, and `{0x01}` alone for the
//! publisher-only key protecting the grantee list reference.

use sha3::{Digest, Keccak256};

use crate::crypto::{PublicKey, SecretKey};
use crate::error::Result;
use crate::types::Key;

/// Nonce deriving the lookup key of an ACT entry.
pub const LOOKUP_NONCE: &[u8] = &[0x00];

/// Nonce deriving the access-key-decryption key of an ACT entry.
pub const DECRYPT_NONCE: &[u8] = &[0x01];

/// Capability for deriving shared keys against a peer public key.
pub trait Session: Send + Sync {
    /// Derive one key per nonce from the shared secret with `peer`.
    ///
    /// Fails with `InvalidPeerKey` when `peer` is not on the curve.
    fn key(&self, peer: &PublicKey, nonces: &[&[u8]]) -> Result<Vec<Key>>;
}

/// The default session over a held secret key.
pub struct SecretKeySession {
    secret: SecretKey,
}

impl SecretKeySession {
    /// Create a session for the holder of `secret`.
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    /// The public identity of this session.
    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }
}

impl Session for SecretKeySession {
    fn key(&self, peer: &PublicKey, nonces: &[&[u8]]) -> Result<Vec<Key>> {
        let shared = self.secret.shared_secret(peer);

        let mut keys = Vec::with_capacity(nonces.len());
        for nonce in nonces {
            let mut hasher = Keccak256::new();
            hasher.update(shared.as_bytes());
            hasher.update(nonce);
            keys.push(Key::from_bytes(hasher.finalize().into()));
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_decrypt_keys_differ() {
        let session = SecretKeySession::new(SecretKey::random());
        let peer = SecretKey::random().public_key();

        let keys = session.key(&peer, &[LOOKUP_NONCE, DECRYPT_NONCE]).unwrap();
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn test_both_parties_derive_same_keys() {
        let publisher = SecretKey::random();
        let grantee = SecretKey::random();
        let publisher_pk = publisher.public_key();
        let grantee_pk = grantee.public_key();

        let publisher_side = SecretKeySession::new(publisher)
            .key(&grantee_pk, &[LOOKUP_NONCE, DECRYPT_NONCE])
            .unwrap();
        let grantee_side = SecretKeySession::new(grantee)
            .key(&publisher_pk, &[LOOKUP_NONCE, DECRYPT_NONCE])
            .unwrap();

        assert_eq!(publisher_side, grantee_side);
    }

    #[test]
    fn test_distinct_peers_distinct_keys() {
        let session = SecretKeySession::new(SecretKey::random());
        let a = SecretKey::random().public_key();
        let b = SecretKey::random().public_key();

        let ka = session.key(&a, &[LOOKUP_NONCE]).unwrap();
        let kb = session.key(&b, &[LOOKUP_NONCE]).unwrap();
        assert_ne!(ka[0], kb[0]);
    }

    #[test]
    fn test_empty_nonce_list() {
        let session = SecretKeySession::new(SecretKey::random());
        let peer = SecretKey::random().public_key();
        assert!(session.key(&peer, &[]).unwrap().is_empty());
    }
}
