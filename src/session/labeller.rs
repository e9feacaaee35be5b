//! The labelling session controller.
//!
//! [`Labeller`] owns everything one rater works with: the working
//! dataset, the navigation cursor, the rating store and the clock used to
//! stamp records. Each public operation corresponds to one user
//! interaction and writes through to the backend before returning.
//!
//! Besides the rating state, the controller persists its workspace (the
//! dataset and cursor) under [`WORKSPACE_KEY`] so a later process picks
//! up where the previous one stopped.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::form::FormValues;
use super::navigation::Navigator;
use super::progress::Progress;
use super::store::RatingStore;
use crate::error::{Error, Result};
use crate::model::{Item, ItemKey, RatingRecord};
use crate::storage::{Event, EventType, StateBackend, WORKSPACE_KEY};
use crate::timestamp::TimestampFormatter;
use crate::transfer::{content_hash, has_changed, ExportPayload, ImportStats, MergeStrategy};

/// Persisted workspace document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Workspace {
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    cursor: usize,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    fingerprint: Option<String>,
    #[serde(default)]
    loaded_at: Option<String>,
    #[serde(default)]
    last_export: Option<String>,
}

/// Snapshot of the session for `status` output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub dataset_size: usize,
    pub source: Option<String>,
    pub fingerprint: Option<String>,
    pub loaded_at: Option<String>,
    /// 1-based position of the cursor.
    pub position: Option<usize>,
    pub rater_id: Option<String>,
    pub stored_ratings: usize,
    pub progress: Progress,
    pub last_export: Option<String>,
    pub timezone: String,
}

/// One dataset row with its stored rating, for listings.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub index: usize,
    pub item: &'a Item,
    pub key: &'a ItemKey,
    pub record: Option<&'a RatingRecord>,
}

impl Entry<'_> {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.record.is_some_and(|r| r.is_complete)
    }
}

/// Session controller over a [`StateBackend`].
#[derive(Debug)]
pub struct Labeller<B: StateBackend> {
    backend: B,
    clock: TimestampFormatter,
    items: Vec<Item>,
    keys: Vec<ItemKey>,
    nav: Navigator,
    store: RatingStore,
    workspace: Workspace,
}

impl<B: StateBackend> Labeller<B> {
    /// Restore a session from `backend`.
    ///
    /// Missing or corrupt state is replaced by an empty session and logged.
    pub fn open(backend: B, clock: TimestampFormatter) -> Self {
        let store = RatingStore::load(&backend);
        let workspace = load_workspace(&backend);

        let items = workspace.items.clone();
        let keys = derive_keys(&items);
        let nav = Navigator::restore(items.len(), workspace.cursor);

        Self {
            backend,
            clock,
            items,
            keys,
            nav,
            store,
            workspace,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn keys(&self) -> &[ItemKey] {
        &self.keys
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[must_use]
    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    /// Replace the working dataset and move the cursor to the first item.
    ///
    /// Stored ratings are kept; those whose keys match the new items show up
    /// again.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be hashed or persisted.
    pub fn set_dataset(&mut self, items: Vec<Item>, source: &str) -> Result<()> {
        let fingerprint = content_hash(&items)?;
        if has_changed(&fingerprint, self.workspace.fingerprint.as_deref()) {
            info!(source, items = items.len(), "dataset loaded");
        } else {
            info!(source, items = items.len(), "same dataset reloaded");
        }

        let workspace = Workspace {
            items,
            cursor: 0,
            source: Some(source.to_string()),
            fingerprint: Some(fingerprint.clone()),
            loaded_at: Some(self.clock.now()),
            last_export: self.workspace.last_export.clone(),
        };
        let event = Event::new("dataset", &fingerprint, EventType::DatasetLoaded, &self.actor())
            .with_comment(&format!("{} items from {source}", workspace.items.len()));
        write_workspace(&mut self.backend, &workspace, &event)?;

        self.keys = derive_keys(&workspace.items);
        self.items = workspace.items.clone();
        self.nav = Navigator::new(self.items.len());
        self.workspace = workspace;
        Ok(())
    }

    /// The item under the cursor with its 0-based index.
    #[must_use]
    pub fn current(&self) -> Option<(usize, &Item)> {
        let index = self.nav.cursor()?;
        self.items.get(index).map(|item| (index, item))
    }

    #[must_use]
    pub fn current_key(&self) -> Option<&ItemKey> {
        self.nav.cursor().and_then(|i| self.keys.get(i))
    }

    #[must_use]
    pub fn current_record(&self) -> Option<&RatingRecord> {
        self.current_key().and_then(|k| self.store.get(k))
    }

    /// The form as rendered for the current item.
    #[must_use]
    pub fn current_form(&self) -> FormValues {
        FormValues::from_record(self.current_record())
    }

    /// Partial autosave: store whatever the form holds. Never rejects on
    /// content.
    ///
    /// # Errors
    ///
    /// Returns `NoDataset` when nothing is loaded, or a storage error.
    pub fn autosave(&mut self, form: &FormValues) -> Result<RatingRecord> {
        self.save(form, EventType::RatingSaved, "autosave")
    }

    /// Strict save: reject the form unless every required field is set.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the missing field (nothing is written),
    /// `NoDataset`, or a storage error.
    pub fn save_strict(&mut self, form: &FormValues) -> Result<RatingRecord> {
        if self.current().is_none() {
            return Err(Error::NoDataset);
        }
        form.validate_strict()?;
        self.save(form, EventType::RatingSaved, "strict")
    }

    /// Reset the current item's form and autosave the empty form.
    ///
    /// # Errors
    ///
    /// Returns `NoDataset` when nothing is loaded, or a storage error.
    pub fn clear_current(&mut self) -> Result<RatingRecord> {
        self.save(&FormValues::default(), EventType::RatingCleared, "cleared")
    }

    /// Autosave `form`, then move by `delta`.
    ///
    /// The autosave happens even when the move is clamped to a no-op.
    /// Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// Returns `NoDataset` when nothing is loaded, or a storage error.
    pub fn navigate(&mut self, delta: isize, form: &FormValues) -> Result<bool> {
        self.autosave(form)?;
        let moved = self.nav.move_by(delta);
        if moved {
            self.persist_cursor()?;
        } else {
            debug!(delta, "navigation clamped");
        }
        Ok(moved)
    }

    /// Jump to a 1-based position, autosaving `form` first.
    ///
    /// An invalid position is rejected before anything is saved.
    ///
    /// # Errors
    ///
    /// Returns `JumpOutOfRange`, `InvalidArgument`, `NoDataset`, or a
    /// storage error.
    pub fn jump(&mut self, input: &str, form: &FormValues) -> Result<usize> {
        let index = self.nav.resolve_position(input)?;
        self.autosave(form)?;
        if self.nav.cursor() != Some(index) {
            self.nav = Navigator::restore(self.items.len(), index);
            self.persist_cursor()?;
        }
        Ok(index)
    }

    /// Set the session rater id, restamping every stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn set_rater_id(&mut self, rater_id: &str) -> Result<()> {
        self.store.set_rater_id(&mut self.backend, rater_id)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::compute(&self.keys, |k| self.store.get(k))
    }

    /// Dataset rows with their stored ratings, in dataset order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.items
            .iter()
            .zip(&self.keys)
            .enumerate()
            .map(|(index, (item, key))| Entry {
                index,
                item,
                key,
                record: self.store.get(key),
            })
    }

    /// Snapshot every stored rating for export, stamped now.
    #[must_use]
    pub fn export_payload(&self) -> ExportPayload {
        ExportPayload::build(&self.store, self.items.len(), self.clock.now())
    }

    /// Remember where the last export went.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace cannot be written.
    pub fn record_export(&mut self, path: &str, ratings: usize) -> Result<()> {
        let mut workspace = self.workspace.clone();
        workspace.last_export = Some(path.to_string());
        let event = Event::new("export", path, EventType::RatingsExported, &self.actor())
            .with_comment(&format!("{ratings} ratings"));
        write_workspace(&mut self.backend, &workspace, &event)?;
        self.workspace = workspace;
        Ok(())
    }

    /// Merge ratings from an export document.
    ///
    /// When a rater id is set, incoming records are stamped with it so the
    /// store keeps a single rater.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn import(
        &mut self,
        payload: &ExportPayload,
        strategy: MergeStrategy,
        source: &str,
    ) -> Result<ImportStats> {
        let event = Event::new("import", source, EventType::RatingsImported, &self.actor())
            .with_comment(strategy.as_str());
        let mut incoming = payload.keyed_ratings();
        if let Some(rater) = self.store.rater_for_records() {
            for (_, record) in &mut incoming {
                record.rater_id = Some(rater.clone());
            }
        }
        let counts = self.store.merge(
            &mut self.backend,
            incoming,
            |external, local| strategy.takes(external, local),
            Some(&event),
        )?;
        info!(
            source,
            created = counts.created,
            updated = counts.updated,
            skipped = counts.skipped,
            "ratings imported"
        );
        Ok(ImportStats {
            created: counts.created,
            updated: counts.updated,
            skipped: counts.skipped,
        })
    }

    /// Drop all ratings and the rater id. The dataset stays loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn reset_ratings(&mut self) -> Result<usize> {
        let dropped = self.store.reset(&mut self.backend)?;
        warn!(dropped, "rating state reset");
        Ok(dropped)
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            dataset_size: self.items.len(),
            source: self.workspace.source.clone(),
            fingerprint: self.workspace.fingerprint.clone(),
            loaded_at: self.workspace.loaded_at.clone(),
            position: self.nav.cursor().map(|c| c + 1),
            rater_id: self.store.rater_for_records(),
            stored_ratings: self.store.len(),
            progress: self.progress(),
            last_export: self.workspace.last_export.clone(),
            timezone: self.clock.zone().name().to_string(),
        }
    }

    fn save(&mut self, form: &FormValues, kind: EventType, comment: &str) -> Result<RatingRecord> {
        let (index, item) = self.current().ok_or(Error::NoDataset)?;
        let record = form.build_record(item, index, self.store.rater_for_records(), self.clock.now());
        let key = self.keys[index].clone();

        let event = Event::new("rating", key.as_str(), kind, &self.actor())
            .with_values(
                None,
                Some(if record.is_complete { "complete" } else { "partial" }.to_string()),
            )
            .with_comment(comment);
        self.store
            .upsert(&mut self.backend, key, record.clone(), Some(&event))?;
        Ok(record)
    }

    fn persist_cursor(&mut self) -> Result<()> {
        let cursor = self.nav.cursor().unwrap_or(0);
        self.workspace.cursor = cursor;
        let event = Event::new("cursor", &(cursor + 1).to_string(), EventType::CursorMoved, &self.actor());
        write_workspace(&mut self.backend, &self.workspace, &event)
    }

    fn actor(&self) -> String {
        self.store
            .rater_for_records()
            .unwrap_or_else(|| "anon".to_string())
    }
}

fn derive_keys(items: &[Item]) -> Vec<ItemKey> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemKey::derive(item, i))
        .collect()
}

fn load_workspace<B: StateBackend + ?Sized>(backend: &B) -> Workspace {
    match backend.read(WORKSPACE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            info!(error = %e, "corrupt workspace, starting without a dataset");
            Workspace::default()
        }),
        Ok(None) => Workspace::default(),
        Err(e) => {
            info!(error = %e, "could not read workspace, starting without a dataset");
            Workspace::default()
        }
    }
}

fn write_workspace<B: StateBackend + ?Sized>(
    backend: &mut B,
    workspace: &Workspace,
    event: &Event,
) -> Result<()> {
    let payload = serde_json::to_string(workspace)?;
    backend.write(WORKSPACE_KEY, &payload, Some(event))
}
