//! Rating store: item key → rating record, mirrored to durable storage.
//!
//! The in-memory map is the source of truth for the running process.
//! Every mutating operation takes the backend and writes the whole state
//! through before returning; there is no batching.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{ItemKey, RatingRecord};
use crate::storage::{Event, EventType, StateBackend, RATINGS_STATE_KEY};

/// Persisted session state: `{ ratingsById, raterId }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub ratings_by_id: BTreeMap<ItemKey, RatingRecord>,
    #[serde(default)]
    pub rater_id: String,
}

/// In-memory rating store backed by [`RATINGS_STATE_KEY`].
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    state: SessionState,
}

impl RatingStore {
    /// Load state from the backend.
    ///
    /// A missing key, an unreadable backend, or a corrupt document all
    /// yield an empty store. The failure is logged, never returned.
    pub fn load<B: StateBackend + ?Sized>(backend: &B) -> Self {
        let raw = match backend.read(RATINGS_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                info!(error = %e, "could not read rating state, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str::<SessionState>(&raw) {
            Ok(state) => {
                debug!(ratings = state.ratings_by_id.len(), "loaded rating state");
                Self { state }
            }
            Err(e) => {
                info!(error = %e, "corrupt rating state, starting empty");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &ItemKey) -> Option<&RatingRecord> {
        self.state.ratings_by_id.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.ratings_by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.ratings_by_id.is_empty()
    }

    /// Session-wide rater id (empty when unset).
    #[must_use]
    pub fn rater_id(&self) -> &str {
        &self.state.rater_id
    }

    /// Rater id as it is stamped onto records: `None` when unset.
    #[must_use]
    pub fn rater_for_records(&self) -> Option<String> {
        Some(self.state.rater_id.clone()).filter(|r| !r.is_empty())
    }

    /// Iterate all records in key order.
    pub fn records(&self) -> impl Iterator<Item = (&ItemKey, &RatingRecord)> {
        self.state.ratings_by_id.iter()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Replace the record at `key` wholesale, then persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn upsert<B: StateBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        key: ItemKey,
        record: RatingRecord,
        event: Option<&Event>,
    ) -> Result<()> {
        self.state.ratings_by_id.insert(key, record);
        self.persist(backend, event)
    }

    /// Set the session rater id and restamp every stored record with it,
    /// then persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn set_rater_id<B: StateBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        rater_id: &str,
    ) -> Result<()> {
        let rater_id = rater_id.trim().to_string();
        let previous = std::mem::replace(&mut self.state.rater_id, rater_id);

        let stamp = self.rater_for_records();
        for record in self.state.ratings_by_id.values_mut() {
            record.rater_id.clone_from(&stamp);
        }

        let actor = stamp.as_deref().unwrap_or("anon");
        let event = Event::new("session", "rater_id", EventType::RaterChanged, actor)
            .with_values(
                Some(previous).filter(|p| !p.is_empty()),
                stamp.clone(),
            );
        self.persist(backend, Some(&event))
    }

    /// Merge many records at once and persist a single time.
    ///
    /// `decide` sees the incoming record and the local one (if any) and
    /// returns whether the incoming record should replace it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn merge<B, F>(
        &mut self,
        backend: &mut B,
        incoming: Vec<(ItemKey, RatingRecord)>,
        mut decide: F,
        event: Option<&Event>,
    ) -> Result<MergeCounts>
    where
        B: StateBackend + ?Sized,
        F: FnMut(&RatingRecord, Option<&RatingRecord>) -> bool,
    {
        let mut counts = MergeCounts::default();
        for (key, record) in incoming {
            let local = self.state.ratings_by_id.get(&key);
            let existed = local.is_some();
            if !decide(&record, local) {
                counts.skipped += 1;
                continue;
            }
            self.state.ratings_by_id.insert(key, record);
            if existed {
                counts.updated += 1;
            } else {
                counts.created += 1;
            }
        }

        if counts.created + counts.updated > 0 {
            self.persist(backend, event)?;
        }
        Ok(counts)
    }

    /// Drop every rating and the rater id, removing the storage key.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn reset<B: StateBackend + ?Sized>(&mut self, backend: &mut B) -> Result<usize> {
        let dropped = self.state.ratings_by_id.len();
        let actor = self.rater_for_records().unwrap_or_else(|| "anon".to_string());
        let event = Event::new("session", RATINGS_STATE_KEY, EventType::StateReset, &actor)
            .with_comment(&format!("{dropped} ratings dropped"));

        backend.remove(RATINGS_STATE_KEY, Some(&event))?;
        self.state = SessionState::default();
        Ok(dropped)
    }

    fn persist<B: StateBackend + ?Sized>(&self, backend: &mut B, event: Option<&Event>) -> Result<()> {
        let payload = serde_json::to_string(&self.state)?;
        backend.write(RATINGS_STATE_KEY, &payload, event)?;
        debug!(ratings = self.state.ratings_by_id.len(), bytes = payload.len(), "rating state written");
        Ok(())
    }
}

/// Outcome counts of [`RatingStore::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeCounts {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn record(index: usize, category: Option<&str>) -> RatingRecord {
        RatingRecord {
            item_index: index,
            id: None,
            uid: None,
            category: category.map(String::from),
            valence: None,
            subcategory: None,
            flagged: false,
            too_short: false,
            promotional: false,
            engagement: false,
            is_complete: false,
            rater_id: None,
            timestamp: String::new(),
        }
    }

    fn key(s: &str) -> ItemKey {
        ItemKey::from(s.to_string())
    }

    #[test]
    fn test_load_missing_is_empty() {
        let backend = MemoryBackend::new();
        let store = RatingStore::load(&backend);
        assert!(store.is_empty());
        assert_eq!(store.rater_id(), "");
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let mut backend = MemoryBackend::new();
        backend.write(RATINGS_STATE_KEY, "{not json", None).unwrap();
        let store = RatingStore::load(&backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_upsert_replaces_wholesale_and_persists() {
        let mut backend = MemoryBackend::new();
        let mut store = RatingStore::load(&backend);

        let mut first = record(0, Some("1"));
        first.flagged = true;
        store.upsert(&mut backend, key("1|"), first, None).unwrap();
        store
            .upsert(&mut backend, key("1|"), record(0, Some("2")), None)
            .unwrap();

        let saved = store.get(&key("1|")).unwrap();
        assert_eq!(saved.category.as_deref(), Some("2"));
        assert!(!saved.flagged, "upsert must not merge fields");

        let reloaded = RatingStore::load(&backend);
        assert_eq!(reloaded.state(), store.state());
    }

    #[test]
    fn test_storage_layout() {
        let mut backend = MemoryBackend::new();
        let mut store = RatingStore::load(&backend);
        store
            .upsert(&mut backend, key("7|u"), record(0, None), None)
            .unwrap();

        let raw = backend.read(RATINGS_STATE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json["ratingsById"]["7|u"].is_object());
        assert_eq!(json["raterId"], "");
    }

    #[test]
    fn test_set_rater_id_restamps_all_records() {
        let mut backend = MemoryBackend::new();
        let mut store = RatingStore::load(&backend);
        store.upsert(&mut backend, key("1|"), record(0, None), None).unwrap();
        store.upsert(&mut backend, key("2|"), record(1, None), None).unwrap();

        store.set_rater_id(&mut backend, "r1").unwrap();
        store.set_rater_id(&mut backend, "r2").unwrap();

        assert_eq!(store.rater_id(), "r2");
        for (_, r) in store.records() {
            assert_eq!(r.rater_id.as_deref(), Some("r2"));
        }

        let reloaded = RatingStore::load(&backend);
        assert_eq!(reloaded.rater_id(), "r2");
        assert!(reloaded.records().all(|(_, r)| r.rater_id.as_deref() == Some("r2")));
    }

    #[test]
    fn test_clearing_rater_id_nulls_records() {
        let mut backend = MemoryBackend::new();
        let mut store = RatingStore::load(&backend);
        store.set_rater_id(&mut backend, "r1").unwrap();
        store.upsert(&mut backend, key("1|"), record(0, None), None).unwrap();

        store.set_rater_id(&mut backend, "  ").unwrap();
        assert_eq!(store.rater_id(), "");
        assert_eq!(store.get(&key("1|")).unwrap().rater_id, None);
    }

    #[test]
    fn test_merge_counts() {
        let mut backend = MemoryBackend::new();
        let mut store = RatingStore::load(&backend);
        store.upsert(&mut backend, key("1|"), record(0, Some("1")), None).unwrap();

        let incoming = vec![
            (key("1|"), record(0, Some("3"))),
            (key("2|"), record(1, Some("4"))),
        ];
        let counts = store
            .merge(&mut backend, incoming, |_, local| local.is_none(), None)
            .unwrap();

        assert_eq!(counts, MergeCounts { created: 1, updated: 0, skipped: 1 });
        assert_eq!(store.get(&key("1|")).unwrap().category.as_deref(), Some("1"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reset_removes_key() {
        let mut backend = MemoryBackend::new();
        let mut store = RatingStore::load(&backend);
        store.set_rater_id(&mut backend, "r1").unwrap();
        store.upsert(&mut backend, key("1|"), record(0, None), None).unwrap();

        assert_eq!(store.reset(&mut backend).unwrap(), 1);
        assert!(store.is_empty());
        assert_eq!(backend.read(RATINGS_STATE_KEY).unwrap(), None);
    }
}
