//! Strong type definitions for the cellar kernel.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CoreError;

/// Length of a content address in bytes.
pub const REFERENCE_SIZE: usize = 32;

/// Length of a symmetric key in bytes.
pub const KEY_SIZE: usize = 32;

/// A 32-byte content address in the underlying chunk store.
///
/// References are opaque to the access control kernel; the zero address
/// is the sentinel for "absent".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference(pub [u8; REFERENCE_SIZE]);

impl Reference {
    /// Create a new Reference from raw bytes.
    pub const fn from_bytes(bytes: [u8; REFERENCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; REFERENCE_SIZE] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::MalformedReference(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }

    /// Whether this is the zero (absent) address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; REFERENCE_SIZE]
    }

    /// The zero address (sentinel for "absent").
    pub const ZERO: Self = Self([0u8; REFERENCE_SIZE]);
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Reference {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; REFERENCE_SIZE]> for Reference {
    fn from(bytes: [u8; REFERENCE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Reference {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; REFERENCE_SIZE] = slice.try_into().map_err(|_| {
            CoreError::MalformedReference(format!(
                "expected {} bytes, got {}",
                REFERENCE_SIZE,
                slice.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

/// A 32-byte symmetric key.
///
/// Covers access keys, lookup keys and key-decryption keys. Zeroed on
/// drop; key material must not outlive the operation that derived it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Mint a fresh random key.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "Key(..)")
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; KEY_SIZE] = slice.try_into().map_err(|_| {
            CoreError::Decrypt(format!("expected {} key bytes, got {}", KEY_SIZE, slice.len()))
        })?;
        Ok(Self(arr))
    }
}
