//! Completion progress over the current dataset.
//!
//! Recomputed from scratch on every call. Fine for the tens-to-thousands
//! of records this tool targets; a very large dataset would want an
//! incremental counter instead.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{ItemKey, RatingRecord};

/// `{ done, total, percent }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    pub percent: u32,
}

impl Progress {
    /// Count dataset keys whose stored record is complete.
    ///
    /// `lookup` resolves a key to its stored record, if any.
    pub fn compute<'a, I, F>(keys: I, lookup: F) -> Self
    where
        I: IntoIterator<Item = &'a ItemKey>,
        F: Fn(&ItemKey) -> Option<&'a RatingRecord>,
    {
        let mut total = 0;
        let mut done = 0;
        for key in keys {
            total += 1;
            if lookup(key).is_some_and(|r| r.is_complete) {
                done += 1;
            }
        }
        Self::from_counts(done, total)
    }

    /// Re-derive progress from a flat list of records (an export's
    /// `ratings` array) instead of the live store.
    #[must_use]
    pub fn from_records(keys: &[ItemKey], records: &[RatingRecord]) -> Self {
        let by_key: HashMap<ItemKey, &RatingRecord> =
            records.iter().map(|r| (r.key(), r)).collect();
        Self::compute(keys, |k| by_key.get(k).copied())
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_counts(done: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (done as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            done,
            total,
            percent,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<ItemKey> {
        (0..n).map(|i| ItemKey::from(format!("{i}|"))).collect()
    }

    fn record(index: usize, complete: bool) -> RatingRecord {
        serde_json::from_value(serde_json::json!({
            "itemIndex": index,
            "isComplete": complete,
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_dataset() {
        let p = Progress::compute(&keys(0), |_| None);
        assert_eq!(p, Progress { done: 0, total: 0, percent: 0 });
    }

    #[test]
    fn test_rounding() {
        assert_eq!(Progress::from_counts(1, 3).percent, 33);
        assert_eq!(Progress::from_counts(2, 3).percent, 67);
        assert_eq!(Progress::from_counts(1, 2).percent, 50);
        assert_eq!(Progress::from_counts(1, 200).percent, 1);
        assert_eq!(Progress::from_counts(3, 3).percent, 100);
    }

    #[test]
    fn test_only_complete_records_count() {
        let records = [record(0, true), record(1, false)];
        let ks = keys(3);
        let p = Progress::compute(&ks, |k| records.iter().find(|r| &r.key() == k));
        assert_eq!(p, Progress { done: 1, total: 3, percent: 33 });
        assert_eq!(p.remaining(), 2);
    }

    #[test]
    fn test_records_outside_dataset_ignored() {
        let records = vec![record(0, true), record(9, true)];
        let p = Progress::from_records(&keys(2), &records);
        assert_eq!(p.done, 1);
        assert_eq!(p.total, 2);
    }
}
