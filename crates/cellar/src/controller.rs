//! The access control controller.
//!
//! Composes the session, the manifest store, the grantee list and the
//! history into the node-facing upload, download and grantee management
//! operations. Every operation is a sequential transaction over the
//! content-addressed store; published roots are never mutated, so a
//! cancelled operation leaves at most unreferenced chunks behind.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use cellar_act::{AccessError, AccessLogic, GranteeList, History, HistoryEntry};
use cellar_core::{Key, KeystreamCipher, PublicKey, Reference, Session, DECRYPT_NONCE};
use cellar_store::{KvStore, LoadSaver};

use crate::error::{Error, Result};

/// Reserved history-entry metadata key carrying the encrypted grantee
/// list reference of a publication.
pub const ENCRYPTED_GL_REF_KEY: &str = "encryptedglref";

/// Controller configuration.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// Disable the fallback to the earliest history entry for lookups
    /// that predate the first publication. The permissive default lets
    /// publishers republish old content without breaking downloads.
    pub strict_history_lookup: bool,
}

/// Result of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Root of the access control manifest used for the upload.
    pub act_ref: Reference,
    /// Root of the history after the upload.
    pub history_ref: Reference,
    /// The encrypted content reference to publish.
    pub encrypted_ref: Reference,
}

/// Result of a grantee management operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranteeUpdate {
    /// Plaintext content address of the grantee list (publisher-internal).
    pub grantee_list_ref: Reference,
    /// The grantee list address encrypted for the publisher; this is the
    /// form that gets published.
    pub encrypted_grantee_list_ref: Reference,
    /// Root of the history after the update.
    pub history_ref: Reference,
    /// Root of the new access control manifest.
    pub act_ref: Reference,
}

/// Orchestrates access-controlled uploads, downloads and grantee
/// management for the holder of one session.
pub struct Controller<S, LS> {
    logic: AccessLogic<S>,
    ls: LS,
    config: ControllerConfig,
}

impl<S: Session, LS: LoadSaver + Clone> Controller<S, LS> {
    /// Create a controller with the default configuration.
    pub fn new(session: S, ls: LS) -> Self {
        Self::with_config(session, ls, ControllerConfig::default())
    }

    /// Create a controller with an explicit configuration.
    pub fn with_config(session: S, ls: LS, config: ControllerConfig) -> Self {
        Self {
            logic: AccessLogic::new(session),
            ls,
            config,
        }
    }

    /// Encrypt a content reference under the publisher's current access
    /// control manifest.
    ///
    /// A zero `history_ref` starts a fresh publication: a new manifest is
    /// created with the caller as publisher and a new history is minted
    /// around it. Otherwise the manifest in force right now is reused and
    /// the history is left untouched.
    pub async fn upload(
        &self,
        reference: &Reference,
        publisher: &PublicKey,
        history_ref: &Reference,
    ) -> Result<UploadResult> {
        let now = now_unix();
        tracing::debug!(
            publisher = %publisher.to_hex(),
            fresh = history_ref.is_zero(),
            "upload"
        );

        if history_ref.is_zero() {
            let mut history = History::new(self.ls.clone());
            let mut act = KvStore::new(self.ls.clone());
            self.logic.add_publisher(&mut act, publisher).await?;

            let act_ref = act.save().await?;
            history.add(act_ref, Some(now), None).await?;
            let history_ref = history.save().await?;

            let encrypted_ref = self.logic.encrypt_ref(&mut act, publisher, reference).await?;
            return Ok(UploadResult {
                act_ref,
                history_ref,
                encrypted_ref,
            });
        }

        let mut history = History::load(self.ls.clone(), *history_ref).await?;
        let entry = self.entry_in_force(&mut history, now).await?;
        let mut act = KvStore::load(self.ls.clone(), entry.reference).await?;

        let encrypted_ref = self.logic.encrypt_ref(&mut act, publisher, reference).await?;
        Ok(UploadResult {
            act_ref: entry.reference,
            history_ref: *history_ref,
            encrypted_ref,
        })
    }

    /// Decrypt a published reference on behalf of the session holder.
    ///
    /// Resolves the manifest in force at `timestamp` through the history,
    /// then recovers the access key through the holder's own manifest
    /// entry. Fails with `Expired` when the history has no applicable
    /// version and `NotGranted` when the holder has no entry.
    pub async fn download(
        &self,
        encrypted_ref: &Reference,
        publisher: &PublicKey,
        history_ref: &Reference,
        timestamp: i64,
    ) -> Result<Reference> {
        tracing::debug!(publisher = %publisher.to_hex(), timestamp, "download");

        let mut history = History::load(self.ls.clone(), *history_ref).await?;
        let entry = self.entry_in_force(&mut history, timestamp).await?;
        let mut act = KvStore::load(self.ls.clone(), entry.reference).await?;

        Ok(self
            .logic
            .decrypt_ref(&mut act, encrypted_ref, publisher)
            .await?)
    }

    /// Apply grantee additions and removals for the publisher.
    ///
    /// Any removal, and the first publication, rotates the access key:
    /// a revoked party may have cached the old key, so the manifest is
    /// rebuilt from scratch around a fresh key and every remaining grantee
    /// is re-added. Pure additions reuse the current key, which keeps
    /// previously published references decryptable without republication.
    pub async fn handle_grantees(
        &self,
        encrypted_gl_ref: &Reference,
        history_ref: &Reference,
        publisher: &PublicKey,
        add: &[PublicKey],
        remove: &[PublicKey],
    ) -> Result<GranteeUpdate> {
        let now = now_unix();
        let first_publication = history_ref.is_zero();

        // Resolve the manifest in force, or mint a fresh one (with its
        // one and only publisher entry) on first publication.
        let mut act = if first_publication {
            let mut fresh = KvStore::new(self.ls.clone());
            self.logic.add_publisher(&mut fresh, publisher).await?;
            fresh
        } else {
            let mut history = History::load(self.ls.clone(), *history_ref).await?;
            let entry = self.entry_in_force(&mut history, now).await?;
            KvStore::load(self.ls.clone(), entry.reference).await?
        };

        let mut gl = if encrypted_gl_ref.is_zero() {
            GranteeList::new(self.ls.clone())
        } else {
            let gl_ref = self.decrypt_ref_for_publisher(publisher, encrypted_gl_ref)?;
            GranteeList::load(self.ls.clone(), gl_ref).await?
        };

        if !add.is_empty() {
            gl.add(add);
        }
        if !remove.is_empty() {
            gl.remove(remove);
        }

        let rekey = !remove.is_empty() || encrypted_gl_ref.is_zero();
        tracing::debug!(
            publisher = %publisher.to_hex(),
            added = add.len(),
            removed = remove.len(),
            rekey,
            "handle grantees"
        );

        let grantees_to_add: Vec<PublicKey> = if rekey {
            if !first_publication {
                // The old access key is assumed compromised; rebuild the
                // manifest around a fresh one.
                act = KvStore::new(self.ls.clone());
                self.logic.add_publisher(&mut act, publisher).await?;
            }
            gl.get().to_vec()
        } else {
            add.to_vec()
        };

        for grantee in &grantees_to_add {
            self.logic.add_grantee(&mut act, publisher, grantee).await?;
        }

        let act_ref = act.save().await?;
        let gl_ref = gl.save().await?;
        let encrypted_gl_ref = self.encrypt_ref_for_publisher(publisher, &gl_ref)?;

        // Re-open the history from its stored root before appending: the
        // lookup above populated in-memory node caches that must not leak
        // into the save.
        let mut history = if first_publication {
            History::new(self.ls.clone())
        } else {
            History::load(self.ls.clone(), *history_ref).await?
        };

        let mut metadata = BTreeMap::new();
        metadata.insert(ENCRYPTED_GL_REF_KEY.to_string(), encrypted_gl_ref.to_hex());
        history.add(act_ref, None, Some(metadata)).await?;
        let history_ref = history.save().await?;

        Ok(GranteeUpdate {
            grantee_list_ref: gl_ref,
            encrypted_grantee_list_ref: encrypted_gl_ref,
            history_ref,
            act_ref,
        })
    }

    /// List the grantees behind a published grantee list reference.
    ///
    /// Only the publisher can decrypt the reference; any other caller
    /// derives a garbage address and the load fails. This is the intended
    /// fail-closed access control for the list itself.
    pub async fn get_grantees(
        &self,
        encrypted_gl_ref: &Reference,
        publisher: &PublicKey,
    ) -> Result<Vec<PublicKey>> {
        let gl_ref = self.decrypt_ref_for_publisher(publisher, encrypted_gl_ref)?;
        let gl = GranteeList::load(self.ls.clone(), gl_ref).await?;
        Ok(gl.get().to_vec())
    }

    async fn entry_in_force(&self, history: &mut History<LS>, at: i64) -> Result<HistoryEntry> {
        let entry = if self.config.strict_history_lookup {
            history.lookup_strict(at).await?
        } else {
            history.lookup(at).await?
        };
        entry.ok_or(Error::Expired)
    }

    fn publisher_only_key(&self, publisher: &PublicKey) -> Result<Key> {
        let mut keys = self.logic.session().key(publisher, &[DECRYPT_NONCE])?;
        match keys.pop() {
            Some(key) => Ok(key),
            None => Err(Error::Access(AccessError::Decrypt(
                "session produced no key".into(),
            ))),
        }
    }

    fn encrypt_ref_for_publisher(
        &self,
        publisher: &PublicKey,
        reference: &Reference,
    ) -> Result<Reference> {
        let key = self.publisher_only_key(publisher)?;
        let encrypted = KeystreamCipher::new(key).encrypt(reference.as_bytes());
        Ok(Reference::try_from(encrypted.as_slice())?)
    }

    fn decrypt_ref_for_publisher(
        &self,
        publisher: &PublicKey,
        encrypted: &Reference,
    ) -> Result<Reference> {
        let key = self.publisher_only_key(publisher)?;
        let decrypted = KeystreamCipher::new(key).decrypt(encrypted.as_bytes());
        Ok(Reference::try_from(decrypted.as_slice())?)
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
