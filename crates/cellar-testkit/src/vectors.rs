//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the exact outputs of the cryptographic primitives:
//! the Keccak-256 digest, the keystream cipher and the session key
//! derivation. Expected values were computed with an independent
//! implementation; any silent change to the constructions fails here
//! first.

/// A Keccak-256 digest vector.
#[derive(Debug, Clone)]
pub struct DigestVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input bytes.
    pub input: &'static [u8],
    /// Expected digest (hex).
    pub expected_digest: &'static str,
}

/// A keystream cipher vector.
#[derive(Debug, Clone)]
pub struct CipherVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Cipher key (32 bytes, hex).
    pub key: &'static str,
    /// Initial counter.
    pub init_ctr: u32,
    /// Plaintext (hex).
    pub plaintext: &'static str,
    /// Expected ciphertext (hex).
    pub expected_ciphertext: &'static str,
}

/// A session key-derivation vector.
///
/// Both parties must derive the same pair, so verification runs the
/// derivation from each side's secret against the other's public key.
#[derive(Debug, Clone)]
pub struct SessionVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The holder's secret scalar (hex).
    pub secret: &'static str,
    /// The peer's secret scalar (hex); the test derives the public key.
    pub peer_secret: &'static str,
    /// Expected lookup key (hex).
    pub expected_lookup_key: &'static str,
    /// Expected key-decryption key (hex).
    pub expected_decrypt_key: &'static str,
}

/// A secret-to-public-key vector (compressed SEC1 encoding).
#[derive(Debug, Clone)]
pub struct PublicKeyVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Secret scalar (hex).
    pub secret: &'static str,
    /// Expected compressed public key (33 bytes, hex).
    pub expected_public_key: &'static str,
}

/// Get all Keccak-256 digest vectors.
pub fn digest_vectors() -> Vec<DigestVector> {
    vec![
        DigestVector {
            name: "empty input",
            input: b"",
            expected_digest: "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        },
        DigestVector {
            name: "abc",
            input: b"abc",
            expected_digest: "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45",
        },
    ]
}

/// Get all keystream cipher vectors.
pub fn cipher_vectors() -> Vec<CipherVector> {
    vec![
        CipherVector {
            name: "zero plaintext exposes keystream segment zero",
            key: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            init_ctr: 0,
            plaintext: "0000000000000000000000000000000000000000000000000000000000000000",
            expected_ciphertext:
                "cc3166d87898a5a75fa097eddc8dba214e7393ed22fa16d6a811a6c94ee10713",
        },
        CipherVector {
            name: "scenario reference under a repeated-byte key",
            key: "a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5",
            init_ctr: 0,
            plaintext: "f7b162a1eea3d92dfc8ac5c6d729e3b5af9f3c1f06df82b42c3cd1ae56f09bf3",
            expected_ciphertext:
                "9019bd0bf3492720a58a0c5f8b7a94f9860ea585c2498f60ee98180da14b061a",
        },
        CipherVector {
            name: "two segments advance the counter",
            key: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            init_ctr: 0,
            plaintext: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f\
                        202122232425262728292a2b2c2d2e2f303132333435363738393a3b3c3d3e3f",
            expected_ciphertext:
                "cc3064db7c9da3a057a99de6d080b42e5e6281fe36ef00c1b008bcd252fc190c\
                 6e3c80cd91ddda3dd89f79c23d30390afb5a6e03c9d3eb0dc59641ea5f616e26",
        },
        CipherVector {
            name: "short tail with a non-zero initial counter",
            key: "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            init_ctr: 7,
            plaintext: "202122232425262728292a2b2c2d2e2f30313233",
            expected_ciphertext: "976f1fdea31d9b0f52a5ecaae971d8aef3cef6a5",
        },
    ]
}

/// Get all session key-derivation vectors.
pub fn session_vectors() -> Vec<SessionVector> {
    vec![
        SessionVector {
            name: "scenario publisher against the scalar-two peer",
            secret: "c786dd84b61485de12146fd9c4c02d87e8fd95f0542765cb7fc3d2e428c0bcfa",
            peer_secret: "0000000000000000000000000000000000000000000000000000000000000002",
            expected_lookup_key:
                "23723ba563b1437080559d0d2fdd0f492a29164e24410da50ca1de8c6d05d366",
            expected_decrypt_key:
                "20ebd0daa5c8b38ce15179a28f39de5cddb91ef97d5a5393594be5e3b4ac3ab1",
        },
        SessionVector {
            name: "repeated-byte scalars",
            secret: "4242424242424242424242424242424242424242424242424242424242424242",
            peer_secret: "0101010101010101010101010101010101010101010101010101010101010101",
            expected_lookup_key:
                "c9b86add5881c5e9d3b9b8ac7ce88e75747026fadda89e37b44aa2976cf4dcaa",
            expected_decrypt_key:
                "5756033d8236f80ce8fd49a0c504b6c020d9bb57b0c96cfa308b3507caa46f3d",
        },
    ]
}

/// Get all public-key encoding vectors.
pub fn public_key_vectors() -> Vec<PublicKeyVector> {
    vec![
        PublicKeyVector {
            name: "scenario publisher",
            secret: "c786dd84b61485de12146fd9c4c02d87e8fd95f0542765cb7fc3d2e428c0bcfa",
            expected_public_key:
                "03296f88ecb5808aba5cbb73f09bde28a6a8fc08679203c1200db8a6bb7c3b43be",
        },
        PublicKeyVector {
            name: "repeated 0x42 scalar",
            secret: "4242424242424242424242424242424242424242424242424242424242424242",
            expected_public_key:
                "0324653eac434488002cc06bbfb7f10fe18991e35f9fe4302dbea6d2353dc0ab1c",
        },
        PublicKeyVector {
            name: "scalar two",
            secret: "0000000000000000000000000000000000000000000000000000000000000002",
            expected_public_key:
                "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellar_core::{
        keccak256, Key, KeystreamCipher, SecretKey, SecretKeySession, Session, DECRYPT_NONCE,
        LOOKUP_NONCE,
    };

    fn bytes32(hex_str: &str) -> [u8; 32] {
        hex::decode(hex_str).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_digest_vectors() {
        for vector in digest_vectors() {
            assert_eq!(
                hex::encode(keccak256(vector.input)),
                vector.expected_digest,
                "digest mismatch for {}",
                vector.name
            );
        }
    }

    #[test]
    fn test_cipher_vectors() {
        for vector in cipher_vectors() {
            let cipher =
                KeystreamCipher::with_counter(Key::from_bytes(bytes32(vector.key)), vector.init_ctr);
            let plaintext = hex::decode(vector.plaintext).unwrap();

            let ciphertext = cipher.encrypt(&plaintext);
            assert_eq!(
                hex::encode(&ciphertext),
                vector.expected_ciphertext,
                "ciphertext mismatch for {}",
                vector.name
            );
            assert_eq!(
                cipher.decrypt(&ciphertext),
                plaintext,
                "roundtrip mismatch for {}",
                vector.name
            );
        }
    }

    #[test]
    fn test_session_vectors_from_both_sides() {
        for vector in session_vectors() {
            let holder = SecretKey::from_bytes(&bytes32(vector.secret)).unwrap();
            let peer = SecretKey::from_bytes(&bytes32(vector.peer_secret)).unwrap();
            let holder_pk = holder.public_key();
            let peer_pk = peer.public_key();

            for (session, against) in [
                (SecretKeySession::new(holder), peer_pk),
                (SecretKeySession::new(peer), holder_pk),
            ] {
                let keys = session
                    .key(&against, &[LOOKUP_NONCE, DECRYPT_NONCE])
                    .unwrap();
                assert_eq!(
                    hex::encode(keys[0].as_bytes()),
                    vector.expected_lookup_key,
                    "lookup key mismatch for {}",
                    vector.name
                );
                assert_eq!(
                    hex::encode(keys[1].as_bytes()),
                    vector.expected_decrypt_key,
                    "decrypt key mismatch for {}",
                    vector.name
                );
            }
        }
    }

    #[test]
    fn test_public_key_vectors() {
        for vector in public_key_vectors() {
            let secret = SecretKey::from_bytes(&bytes32(vector.secret)).unwrap();
            assert_eq!(
                secret.public_key().to_hex(),
                vector.expected_public_key,
                "public key mismatch for {}",
                vector.name
            );
        }
    }
}
