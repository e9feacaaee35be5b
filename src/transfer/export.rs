//! Rating export: the downloadable JSON document.
//!
//! ```json
//! {"raterId":"r1","createdAt":"2024-06-01T10:00:00-04:00","datasetSize":2,"ratings":[...]}
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::model::{ItemKey, RatingRecord};
use crate::session::RatingStore;
use crate::transfer::file::atomic_write;

/// Exported snapshot of every stored rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    /// Session rater id, `null` when unset.
    pub rater_id: Option<String>,
    pub created_at: String,
    pub dataset_size: usize,
    pub ratings: Vec<RatingRecord>,
}

impl ExportPayload {
    /// Snapshot the store.
    ///
    /// Records without a rater id are stamped with the session one.
    /// Ratings are ordered by item index, then key.
    #[must_use]
    pub fn build(store: &RatingStore, dataset_size: usize, created_at: String) -> Self {
        let rater_id = store.rater_for_records();

        let mut keyed: Vec<(&ItemKey, RatingRecord)> = store
            .records()
            .map(|(key, record)| {
                let mut record = record.clone();
                if record.rater_id.is_none() {
                    record.rater_id.clone_from(&rater_id);
                }
                (key, record)
            })
            .collect();
        keyed.sort_by(|(ka, a), (kb, b)| a.item_index.cmp(&b.item_index).then_with(|| ka.cmp(kb)));

        Self {
            rater_id,
            created_at,
            dataset_size,
            ratings: keyed.into_iter().map(|(_, r)| r).collect(),
        }
    }

    /// Ratings paired with their store keys.
    #[must_use]
    pub fn keyed_ratings(&self) -> Vec<(ItemKey, RatingRecord)> {
        self.ratings.iter().map(|r| (r.key(), r.clone())).collect()
    }
}

/// `ratings_<rater-or-anon>_<millis>.json`
///
/// The rater segment has path separators, reserved characters, and
/// whitespace replaced with `_`.
#[must_use]
pub fn export_filename(rater_id: Option<&str>, millis: i64) -> String {
    let rater = rater_id
        .and_then(sanitize_segment)
        .unwrap_or_else(|| "anon".to_string());
    format!("ratings_{rater}_{millis}.json")
}

fn sanitize_segment(raw: &str) -> Option<String> {
    let sanitized: String = raw
        .trim()
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_whitespace()
            {
                '_'
            } else {
                c
            }
        })
        .take(100)
        .collect();

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Write the payload into `dir` and return the file path.
///
/// # Errors
///
/// Returns an error if serialization or the atomic write fails.
pub fn write_export(payload: &ExportPayload, dir: &Path, millis: i64) -> Result<PathBuf> {
    let path = dir.join(export_filename(payload.rater_id.as_deref(), millis));
    let mut content = serde_json::to_string_pretty(payload)?;
    content.push('\n');
    atomic_write(&path, &content)?;
    info!(path = %path.display(), ratings = payload.ratings.len(), "export written");
    Ok(path)
}
