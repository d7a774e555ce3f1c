//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use cellar_core::{PublicKey, SecretKey, SecretKeySession};
use cellar_store::MemoryStorage;

/// Seed of the deterministic publisher key used by the end-to-end
/// scenarios.
pub const PUBLISHER_SEED_HEX: &str =
    "c786dd84b61485de12146fd9c4c02d87e8fd95f0542765cb7fc3d2e428c0bcfa";

/// Deterministic content reference used by the end-to-end scenarios.
pub const REFERENCE_HEX: &str =
    "f7b162a1eea3d92dfc8ac5c6d729e3b5af9f3c1f06df82b42c3cd1ae56f09bf3";

/// A test fixture: one party's secret key plus a storage handle.
pub struct TestFixture {
    pub secret: SecretKey,
    pub storage: MemoryStorage,
}

impl TestFixture {
    /// Create a fixture with a random key and its own empty storage.
    pub fn new() -> Self {
        Self {
            secret: SecretKey::random(),
            storage: MemoryStorage::new(),
        }
    }

    /// Create with a deterministic key from a seed scalar.
    ///
    /// Panics on a zero or out-of-range scalar; pick another seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            secret: SecretKey::from_bytes(&seed).expect("seed must be a valid scalar"),
            storage: MemoryStorage::new(),
        }
    }

    /// The deterministic publisher of the end-to-end scenarios.
    pub fn scenario_publisher() -> Self {
        Self::with_seed(decode_seed(PUBLISHER_SEED_HEX))
    }

    /// The fixture's public key.
    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// A session over a clone of the fixture's secret key.
    pub fn session(&self) -> SecretKeySession {
        SecretKeySession::new(self.secret.clone())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures that share one storage, for multi-party
/// scenarios where publisher and grantees read the same chunks.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    let storage = MemoryStorage::new();
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[31] = (i + 1) as u8;
            TestFixture {
                secret: SecretKey::from_bytes(&seed).expect("small scalar is valid"),
                storage: storage.clone(),
            }
        })
        .collect()
}

fn decode_seed(hex_seed: &str) -> [u8; 32] {
    let bytes = hex::decode(hex_seed).expect("valid hex seed");
    bytes.try_into().expect("seed is 32 bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_seed_is_deterministic() {
        let a = TestFixture::with_seed([0x42; 32]);
        let b = TestFixture::with_seed([0x42; 32]);
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_scenario_publisher_is_stable() {
        assert_eq!(
            TestFixture::scenario_publisher().public_key(),
            TestFixture::scenario_publisher().public_key()
        );
    }

    #[test]
    fn test_multi_party_unique_keys_shared_storage() {
        let parties = multi_party_fixtures(3);

        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }
}
