//! Time-indexed history of access control manifests.
//!
//! Each entry maps an instant to the manifest root in force from that
//! instant on. Keys are `i64::MAX - unix_seconds` rendered as fixed-width
//! decimal, so the manifest's lexicographic walk order is
//! reverse-chronological and the newest applicable entry is found first.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::time::{SystemTime, UNIX_EPOCH};

use cellar_core::Reference;
use cellar_store::{Entry, LoadSaver, Manifest};

use crate::error::{AccessError, Result};

/// Width of a rendered history key: `i64::MAX` has 19 decimal digits.
const KEY_WIDTH: usize = 20;

/// One history entry: a manifest root valid from `timestamp` on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The instant the publisher committed this manifest.
    pub timestamp: i64,

    /// Root reference of the manifest in force.
    pub reference: Reference,

    /// String metadata attached by the publisher.
    pub metadata: BTreeMap<String, String>,
}

/// A persistable, time-indexed map of manifest roots.
pub struct History<LS> {
    manifest: Manifest<LS>,
}

impl<LS: LoadSaver> History<LS> {
    /// Create an empty history.
    pub fn new(ls: LS) -> Self {
        Self {
            manifest: Manifest::new(ls),
        }
    }

    /// Open a history from its root reference.
    pub async fn load(ls: LS, reference: Reference) -> Result<Self> {
        Ok(Self {
            manifest: Manifest::load(ls, reference).await?,
        })
    }

    /// Append an entry.
    ///
    /// `timestamp` defaults to the current wall clock; two entries with
    /// the same timestamp share a key, so the later insert wins. Negative
    /// timestamps fail with `InvalidTimestamp`.
    pub async fn add(
        &mut self,
        act_ref: Reference,
        timestamp: Option<i64>,
        metadata: Option<BTreeMap<String, String>>,
    ) -> Result<()> {
        let timestamp = timestamp.unwrap_or_else(now_unix);
        let key = key_for(timestamp)?;
        let entry = Entry::with_metadata(
            act_ref.as_bytes().to_vec(),
            metadata.unwrap_or_default(),
        );
        self.manifest.insert(key.as_bytes(), entry).await?;
        Ok(())
    }

    /// The entry in force at instant `at`.
    ///
    /// Returns the newest entry with `timestamp <= at`; when none exists
    /// the earliest known entry is returned as a fallback, so lookups
    /// before the first publication still resolve. `None` only on an
    /// empty history.
    pub async fn lookup(&mut self, at: i64) -> Result<Option<HistoryEntry>> {
        self.lookup_inner(at, true).await
    }

    /// Like [`lookup`](Self::lookup), without the fallback to the
    /// earliest entry.
    pub async fn lookup_strict(&mut self, at: i64) -> Result<Option<HistoryEntry>> {
        self.lookup_inner(at, false).await
    }

    async fn lookup_inner(&mut self, at: i64, allow_fallback: bool) -> Result<Option<HistoryEntry>> {
        if at <= 0 {
            return Err(AccessError::InvalidTimestamp);
        }
        let searched = i64::MAX - at;

        // `before` is the newest entry at or before the searched instant;
        // `after` trails the walk and ends up as the earliest entry when
        // nothing matches.
        let mut before: Option<HistoryEntry> = None;
        let mut after: Option<HistoryEntry> = None;

        self.manifest
            .walk(&mut |key, entry| {
                let parsed = match parse_key(key) {
                    Some(parsed) => parsed,
                    None => return ControlFlow::Continue(()),
                };
                let reference = match Reference::try_from(entry.value.as_slice()) {
                    Ok(reference) => reference,
                    Err(_) => return ControlFlow::Continue(()),
                };
                let found = HistoryEntry {
                    timestamp: i64::MAX - parsed,
                    reference,
                    metadata: entry.metadata.clone(),
                };
                after = Some(found.clone());
                if searched <= parsed {
                    before = Some(found);
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            })
            .await?;

        if before.is_some() {
            return Ok(before);
        }
        if allow_fallback {
            return Ok(after);
        }
        Ok(None)
    }

    /// Persist the history and return its root reference.
    pub async fn save(&mut self) -> Result<Reference> {
        Ok(self.manifest.save().await?)
    }
}

fn key_for(timestamp: i64) -> Result<String> {
    // A negative timestamp would push the reversed key past i64::MAX.
    let reversed = i64::MAX
        .checked_sub(timestamp)
        .ok_or(AccessError::InvalidTimestamp)?;
    Ok(format!("{:0width$}", reversed, width = KEY_WIDTH))
}

/// Parse a stored key back into its reversed-timestamp value.
///
/// Keys that do not parse, or that map to a timestamp outside the valid
/// range, never match a lookup.
fn parse_key(key: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(key).ok()?;
    let parsed: i64 = text.parse().ok()?;
    if parsed < 0 {
        return None;
    }
    Some(parsed)
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellar_store::MemoryStorage;

    // 1994-04-01, 2000-04-01 and 2015-04-01, all at midnight UTC.
    const TS_1994: i64 = 765_158_400;
    const TS_2000: i64 = 954_547_200;
    const TS_2015: i64 = 1_427_846_400;

    fn act_ref(byte: u8) -> Reference {
        Reference::from_bytes([byte; 32])
    }

    async fn populated(storage: MemoryStorage) -> History<MemoryStorage> {
        let mut history = History::new(storage);
        history.add(act_ref(1), Some(TS_1994), None).await.unwrap();
        history.add(act_ref(2), Some(TS_2000), None).await.unwrap();
        history.add(act_ref(3), Some(TS_2015), None).await.unwrap();
        history
    }

    #[tokio::test]
    async fn test_lookup_between_entries() {
        // 2001-04-01 resolves to the 2000-04-01 entry.
        let mut history = populated(MemoryStorage::new()).await;
        let entry = history.lookup(986_083_200).await.unwrap().unwrap();
        assert_eq!(entry.timestamp, TS_2000);
        assert_eq!(entry.reference, act_ref(2));
    }

    #[tokio::test]
    async fn test_lookup_before_first_falls_back_to_earliest() {
        // 1980-01-01 predates every entry; the earliest one is returned.
        let mut history = populated(MemoryStorage::new()).await;
        let entry = history.lookup(315_532_800).await.unwrap().unwrap();
        assert_eq!(entry.timestamp, TS_1994);
        assert_eq!(entry.reference, act_ref(1));
    }

    #[tokio::test]
    async fn test_strict_lookup_before_first_finds_nothing() {
        let mut history = populated(MemoryStorage::new()).await;
        assert_eq!(history.lookup_strict(315_532_800).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_after_last() {
        // 2020-01-01 resolves to the newest entry.
        let mut history = populated(MemoryStorage::new()).await;
        let entry = history.lookup(1_577_836_800).await.unwrap().unwrap();
        assert_eq!(entry.timestamp, TS_2015);
        assert_eq!(entry.reference, act_ref(3));
    }

    #[tokio::test]
    async fn test_lookup_exact_timestamp() {
        let mut history = populated(MemoryStorage::new()).await;
        let entry = history.lookup(TS_2000).await.unwrap().unwrap();
        assert_eq!(entry.timestamp, TS_2000);
    }

    #[tokio::test]
    async fn test_empty_history_finds_nothing() {
        let mut history = History::new(MemoryStorage::new());
        assert_eq!(history.lookup(TS_2000).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_positive_timestamp_rejected() {
        let mut history = populated(MemoryStorage::new()).await;
        assert!(matches!(
            history.lookup(0).await,
            Err(AccessError::InvalidTimestamp)
        ));
        assert!(matches!(
            history.lookup(-5).await,
            Err(AccessError::InvalidTimestamp)
        ));
    }

    #[tokio::test]
    async fn test_add_negative_timestamp_rejected() {
        let mut history = History::new(MemoryStorage::new());
        assert!(matches!(
            history.add(act_ref(1), Some(-1), None).await,
            Err(AccessError::InvalidTimestamp)
        ));
    }

    #[tokio::test]
    async fn test_tied_timestamps_last_insert_wins() {
        let mut history = History::new(MemoryStorage::new());
        history.add(act_ref(1), Some(TS_2000), None).await.unwrap();
        history.add(act_ref(2), Some(TS_2000), None).await.unwrap();

        let entry = history.lookup(TS_2000).await.unwrap().unwrap();
        assert_eq!(entry.reference, act_ref(2));
    }

    #[tokio::test]
    async fn test_metadata_survives_persistence() {
        let storage = MemoryStorage::new();
        let mut history = History::new(storage.clone());

        let mut metadata = BTreeMap::new();
        metadata.insert("encryptedglref".to_string(), "ab".repeat(32));
        history
            .add(act_ref(7), Some(TS_2015), Some(metadata.clone()))
            .await
            .unwrap();
        let reference = history.save().await.unwrap();

        let mut reloaded = History::load(storage, reference).await.unwrap();
        let entry = reloaded.lookup(TS_2015).await.unwrap().unwrap();
        assert_eq!(entry.metadata, metadata);
    }

    #[tokio::test]
    async fn test_key_encoding_is_fixed_width() {
        let key = key_for(TS_2000).unwrap();
        assert_eq!(key.len(), KEY_WIDTH);
        assert_eq!(key, format!("{:020}", i64::MAX - TS_2000));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_newer_timestamps_sort_first(a in 1i64..i64::MAX, b in 1i64..i64::MAX) {
                prop_assume!(a < b);
                // Lexicographic key order is reverse-chronological.
                prop_assert!(key_for(b).unwrap() < key_for(a).unwrap());
            }

            #[test]
            fn prop_key_roundtrips_through_parse(ts in 0i64..=i64::MAX) {
                let key = key_for(ts).unwrap();
                prop_assert_eq!(parse_key(key.as_bytes()), Some(i64::MAX - ts));
            }
        }
    }
}
