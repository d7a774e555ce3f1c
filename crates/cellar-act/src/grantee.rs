//! The persisted grantee list.
//!
//! An ordered set of grantee public keys. The plaintext content address
//! of the list is only ever handled by the publisher; what gets published
//! is that address encrypted under the publisher's own session key.

use bytes::Bytes;

use cellar_core::{PublicKey, Reference};
use cellar_store::LoadSaver;

use crate::error::{AccessError, Result};

/// A persistable ordered set of grantee public keys.
pub struct GranteeList<LS> {
    grantees: Vec<PublicKey>,
    ls: LS,
}

impl<LS: LoadSaver> GranteeList<LS> {
    /// Create an empty list.
    pub fn new(ls: LS) -> Self {
        Self {
            grantees: Vec::new(),
            ls,
        }
    }

    /// Open a list from its plaintext content address.
    ///
    /// Fails with `Codec` on a malformed payload; a garbage reference
    /// produced by decrypting under the wrong key ends up here or in
    /// `NotFound`, which is what keeps the list publisher-only.
    pub async fn load(ls: LS, reference: Reference) -> Result<Self> {
        let bytes = ls.load(&reference).await?;
        let grantees = decode(&bytes)?;
        Ok(Self { grantees, ls })
    }

    /// Append the given keys, silently skipping ones already present.
    pub fn add(&mut self, keys: &[PublicKey]) {
        for key in keys {
            if !self.grantees.contains(key) {
                self.grantees.push(*key);
            }
        }
    }

    /// Remove the given keys; absent keys are a no-op.
    pub fn remove(&mut self, keys: &[PublicKey]) {
        self.grantees.retain(|grantee| !keys.contains(grantee));
    }

    /// The grantees in insertion order.
    pub fn get(&self) -> &[PublicKey] {
        &self.grantees
    }

    /// Persist the list and return its plaintext content address.
    pub async fn save(&mut self) -> Result<Reference> {
        let mut buf = Vec::new();
        let payload: Vec<Vec<u8>> = self.grantees.iter().map(|pk| pk.to_bytes()).collect();
        ciborium::into_writer(&payload, &mut buf)
            .map_err(|e| AccessError::Codec(e.to_string()))?;
        let reference = self.ls.save(Bytes::from(buf)).await?;
        Ok(reference)
    }
}

fn decode(bytes: &[u8]) -> Result<Vec<PublicKey>> {
    let payload: Vec<Vec<u8>> =
        ciborium::from_reader(bytes).map_err(|e| AccessError::Codec(e.to_string()))?;

    let mut grantees = Vec::with_capacity(payload.len());
    for raw in payload {
        let key = PublicKey::from_sec1_bytes(&raw)
            .map_err(|_| AccessError::Codec("grantee key not on curve".into()))?;
        grantees.push(key);
    }
    Ok(grantees)
}

impl<LS> std::fmt::Debug for GranteeList<LS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GranteeList")
            .field("len", &self.grantees.len())
            .finish()
    }
}
