//! Length-preserving symmetric cipher for content references.
//!
//! A CTR-style construction: the keystream for segment `i` is
//! `Keccak256(Keccak256(key || le32(init_ctr + i)))` and is XORed over the
//! input. Deterministic and unauthenticated; integrity comes from the
//! content-addressed store.

use sha3::{Digest, Keccak256};

use crate::types::Key;

/// Keystream segment width in bytes (one Keccak-256 digest).
const SEGMENT_SIZE: usize = 32;

/// Symmetric cipher over fixed-width references and key payloads.
pub struct KeystreamCipher {
    key: Key,
    init_ctr: u32,
}

impl KeystreamCipher {
    /// Create a cipher with an explicit initial counter.
    pub fn with_counter(key: Key, init_ctr: u32) -> Self {
        Self { key, init_ctr }
    }

    /// Create a cipher with the default counter of zero.
    pub fn new(key: Key) -> Self {
        Self::with_counter(key, 0)
    }

    /// Encrypt a plaintext. Output length equals input length.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.transcrypt(plaintext)
    }

    /// Decrypt a ciphertext. Inverse of [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, ciphertext: &[u8]) -> Vec<u8> {
        self.transcrypt(ciphertext)
    }

    fn transcrypt(&self, input: &[u8]) -> Vec<u8> {
        let mut output = Vec::with_capacity(input.len());
        for (i, segment) in input.chunks(SEGMENT_SIZE).enumerate() {
            let segment_key = self.segment_key(self.init_ctr.wrapping_add(i as u32));
            output.extend(segment.iter().zip(segment_key.iter()).map(|(b, k)| b ^ k));
        }
        output
    }

    // First round binds key and counter, second round keeps the
    // key-dependent digest out of the keystream.
    fn segment_key(&self, ctr: u32) -> [u8; SEGMENT_SIZE] {
        let mut hasher = Keccak256::new();
        hasher.update(self.key.as_bytes());
        hasher.update(ctr.to_le_bytes());
        let ctr_hash = hasher.finalize();

        let mut hasher = Keccak256::new();
        hasher.update(ctr_hash);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cipher(byte: u8) -> KeystreamCipher {
        KeystreamCipher::new(Key::from_bytes([byte; 32]))
    }

    #[test]
    fn test_roundtrip() {
        let c = cipher(0x11);
        let plaintext = b"a reference to some published content";
        assert_eq!(c.decrypt(&c.encrypt(plaintext)), plaintext);
    }

    #[test]
    fn test_deterministic() {
        let c = cipher(0x22);
        assert_eq!(c.encrypt(b"same input"), c.encrypt(b"same input"));
    }

    #[test]
    fn test_length_preserving() {
        let c = cipher(0x33);
        for len in [0usize, 1, 31, 32, 33, 64, 100] {
            assert_eq!(c.encrypt(&vec![0xab; len]).len(), len);
        }
    }

    #[test]
    fn test_different_keys_differ() {
        let input = [0u8; 32];
        assert_ne!(cipher(0x01).encrypt(&input), cipher(0x02).encrypt(&input));
    }

    #[test]
    fn test_counter_shifts_keystream() {
        let key = Key::from_bytes([0x44; 32]);
        let a = KeystreamCipher::with_counter(key.clone(), 0).encrypt(&[0u8; 32]);
        let b = KeystreamCipher::with_counter(key, 1).encrypt(&[0u8; 32]);
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(key in any::<[u8; 32]>(), data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let c = KeystreamCipher::new(Key::from_bytes(key));
            prop_assert_eq!(c.decrypt(&c.encrypt(&data)), data);
        }
    }
}
