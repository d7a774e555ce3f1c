//! The access-key protocol over an access control manifest.
//!
//! Every member of a manifest (the publisher included) is represented by
//! one entry mapping their lookup key to the access key encrypted under
//! their key-decryption key. Both keys derive from the same shared secret
//! between the publisher and the member, so either side can recompute them
//! from its own secret key and the other party's public key. The lookup
//! key is safe to publish; the decryption key never leaves the member.

use cellar_core::{
    Key, KeystreamCipher, PublicKey, Reference, Session, DECRYPT_NONCE, LOOKUP_NONCE,
};
use cellar_store::{KvStore, LoadSaver, StoreError};

use crate::error::{AccessError, Result};

/// Protocol operations binding public keys to manifest entries.
pub struct AccessLogic<S> {
    session: S,
}

impl<S: Session> AccessLogic<S> {
    /// Create the access logic over a session.
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// The session used for key derivation.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mint a fresh access key and store it for the publisher.
    ///
    /// Must be called exactly once per fresh manifest; a second call would
    /// mint a second access key and orphan everything encrypted under the
    /// first.
    pub async fn add_publisher<LS: LoadSaver>(
        &self,
        act: &mut KvStore<LS>,
        publisher: &PublicKey,
    ) -> Result<()> {
        self.store_access_key(act, publisher, &Key::random()).await
    }

    /// Grant `grantee` access by re-encrypting the publisher's access key
    /// for them.
    ///
    /// When the grantee is the publisher this mints a fresh access key
    /// instead. Fails with `NoPublisher` when the manifest has no
    /// publisher entry to read the access key from.
    pub async fn add_grantee<LS: LoadSaver>(
        &self,
        act: &mut KvStore<LS>,
        publisher: &PublicKey,
        grantee: &PublicKey,
    ) -> Result<()> {
        if grantee == publisher {
            return self.add_publisher(act, publisher).await;
        }
        let access_key = self.access_key(act, publisher).await?;
        self.store_access_key(act, grantee, &access_key).await
    }

    /// Encrypt a reference under the manifest's access key.
    pub async fn encrypt_ref<LS: LoadSaver>(
        &self,
        act: &mut KvStore<LS>,
        publisher: &PublicKey,
        reference: &Reference,
    ) -> Result<Reference> {
        let access_key = self.access_key(act, publisher).await?;
        let encrypted = KeystreamCipher::new(access_key).encrypt(reference.as_bytes());
        Reference::try_from(encrypted.as_slice()).map_err(AccessError::from)
    }

    /// Decrypt a reference on behalf of the session holder.
    ///
    /// Derives the holder's own lookup and decryption keys against the
    /// publisher, recovers the access key from the manifest and decrypts.
    /// Fails with `NotGranted` when the holder has no manifest entry.
    pub async fn decrypt_ref<LS: LoadSaver>(
        &self,
        act: &mut KvStore<LS>,
        encrypted_ref: &Reference,
        publisher: &PublicKey,
    ) -> Result<Reference> {
        let (lookup, decrypt) = self.member_keys(publisher)?;

        let encrypted_access_key = match act.get(lookup.as_bytes()).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound) => return Err(AccessError::NotGranted),
            Err(e) => return Err(e.into()),
        };
        let access_key = decrypt_access_key(&decrypt, &encrypted_access_key)?;

        let reference = KeystreamCipher::new(access_key).decrypt(encrypted_ref.as_bytes());
        Reference::try_from(reference.as_slice()).map_err(AccessError::from)
    }

    /// Recover the manifest's access key through the publisher's entry.
    async fn access_key<LS: LoadSaver>(
        &self,
        act: &mut KvStore<LS>,
        publisher: &PublicKey,
    ) -> Result<Key> {
        let (lookup, decrypt) = self.member_keys(publisher)?;

        let encrypted = match act.get(lookup.as_bytes()).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound) => return Err(AccessError::NoPublisher),
            Err(e) => return Err(e.into()),
        };
        decrypt_access_key(&decrypt, &encrypted)
    }

    /// Encrypt `access_key` for `member` and store it under their lookup key.
    async fn store_access_key<LS: LoadSaver>(
        &self,
        act: &mut KvStore<LS>,
        member: &PublicKey,
        access_key: &Key,
    ) -> Result<()> {
        let (lookup, decrypt) = self.member_keys(member)?;
        let encrypted = KeystreamCipher::new(decrypt).encrypt(access_key.as_bytes());
        act.put(lookup.as_bytes(), encrypted).await?;
        Ok(())
    }

    /// Derive the (lookup, decryption) key pair for a member.
    fn member_keys(&self, member: &PublicKey) -> Result<(Key, Key)> {
        let mut keys = self.session.key(member, &[LOOKUP_NONCE, DECRYPT_NONCE])?;
        let count = keys.len();
        let decrypt = keys.pop();
        let lookup = keys.pop();
        match (lookup, decrypt) {
            (Some(lookup), Some(decrypt)) if count == 2 => Ok((lookup, decrypt)),
            _ => Err(AccessError::Decrypt(format!(
                "session produced {count} keys, expected 2"
            ))),
        }
    }
}

fn decrypt_access_key(decryption_key: &Key, encrypted: &[u8]) -> Result<Key> {
    let decrypted = KeystreamCipher::new(decryption_key.clone()).decrypt(encrypted);
    Key::try_from(decrypted.as_slice())
        .map_err(|_| AccessError::Decrypt(format!("access key payload of {} bytes", encrypted.len())))
}
