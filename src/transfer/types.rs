//! Shared types for dataset and rating transfer.

use serde::Serialize;

use crate::model::RatingRecord;
use crate::timestamp;

/// Conflict resolution strategy for imports.
///
/// When importing a rating whose key already exists locally, this
/// determines which version wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MergeStrategy {
    /// Use the record with the newer `timestamp`.
    #[default]
    PreferNewer,
    /// Always keep the local version.
    PreferLocal,
    /// Always take the external (imported) version.
    PreferExternal,
}

impl MergeStrategy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreferNewer => "prefer-newer",
            Self::PreferLocal => "prefer-local",
            Self::PreferExternal => "prefer-external",
        }
    }

    /// Whether `external` should replace `local`.
    ///
    /// A rating with no local counterpart is always taken. Under
    /// `PreferNewer`, an unparseable external timestamp never wins and an
    /// unparseable local one always loses.
    #[must_use]
    pub fn takes(&self, external: &RatingRecord, local: Option<&RatingRecord>) -> bool {
        let Some(local) = local else {
            return true;
        };
        match self {
            Self::PreferLocal => false,
            Self::PreferExternal => true,
            Self::PreferNewer => {
                match (
                    timestamp::parse(&external.timestamp),
                    timestamp::parse(&local.timestamp),
                ) {
                    (Some(ext), Some(loc)) => ext > loc,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            }
        }
    }
}

/// Statistics for an import operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    /// Number of new records created.
    pub created: usize,
    /// Number of existing records updated.
    pub updated: usize,
    /// Number of records skipped (merge strategy chose local).
    pub skipped: usize,
}

impl ImportStats {
    /// Total records processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: &str) -> RatingRecord {
        serde_json::from_value(serde_json::json!({"itemIndex": 0, "timestamp": ts})).unwrap()
    }

    #[test]
    fn test_merge_strategy_default() {
        assert_eq!(MergeStrategy::default(), MergeStrategy::PreferNewer);
    }

    #[test]
    fn test_new_records_always_taken() {
        for s in [
            MergeStrategy::PreferNewer,
            MergeStrategy::PreferLocal,
            MergeStrategy::PreferExternal,
        ] {
            assert!(s.takes(&at("garbage"), None), "{}", s.as_str());
        }
    }

    #[test]
    fn test_prefer_newer_compares_instants() {
        let s = MergeStrategy::PreferNewer;
        let older = at("2024-06-01T10:00:00-05:00");
        let newer = at("2024-06-01T12:00:00-04:00");
        assert!(s.takes(&newer, Some(&older)));
        assert!(!s.takes(&older, Some(&newer)));
        assert!(!s.takes(&older, Some(&older)));
        assert!(!s.takes(&at(""), Some(&older)));
        assert!(s.takes(&older, Some(&at(""))));
    }

    #[test]
    fn test_fixed_strategies() {
        let a = at("2024-01-01T00:00:00+00:00");
        let b = at("2025-01-01T00:00:00+00:00");
        assert!(!MergeStrategy::PreferLocal.takes(&b, Some(&a)));
        assert!(MergeStrategy::PreferExternal.takes(&a, Some(&b)));
    }

    #[test]
    fn test_import_stats_total() {
        let stats = ImportStats {
            created: 2,
            updated: 1,
            skipped: 4,
        };
        assert_eq!(stats.total(), 7);
    }
}
