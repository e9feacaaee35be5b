//! Rating record: the structured judgment a rater assigns to one item.

use serde::{Deserialize, Serialize};

use super::item::{ItemId, ItemKey};
use crate::validate::requires_subcategory;

/// A stored rating, keyed by [`ItemKey`] in the rating store.
///
/// Field names are camelCase on the wire to match the storage layout and
/// the export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    /// Position of the item when this record was saved.
    pub item_index: usize,

    #[serde(default)]
    pub id: Option<ItemId>,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub valence: Option<String>,

    #[serde(default)]
    pub subcategory: Option<String>,

    #[serde(default)]
    pub flagged: bool,

    #[serde(default)]
    pub too_short: bool,

    #[serde(default)]
    pub promotional: bool,

    #[serde(default)]
    pub engagement: bool,

    #[serde(default)]
    pub is_complete: bool,

    #[serde(default)]
    pub rater_id: Option<String>,

    #[serde(default)]
    pub timestamp: String,
}

impl RatingRecord {
    /// Key this record belongs under, re-derived from its own fields.
    ///
    /// Matches [`ItemKey::derive`] for the item it was saved from, as long
    /// as the item sat at `item_index` when it had no `id`.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey::from_parts(self.id.as_ref(), self.uid.as_deref(), self.item_index)
    }
}

/// Whether category + valence (+ subcategory when the category needs one)
/// are all present and non-empty.
#[must_use]
pub fn strict_fields_complete(
    category: Option<&str>,
    valence: Option<&str>,
    subcategory: Option<&str>,
) -> bool {
    let present = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());

    let Some(category) = category.filter(|c| !c.trim().is_empty()) else {
        return false;
    };
    if !present(valence) {
        return false;
    }
    !requires_subcategory(category) || present(subcategory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_fields_complete() {
        assert!(strict_fields_complete(Some("1"), Some("pos"), None));
        assert!(strict_fields_complete(Some("2"), Some("neg"), Some("x")));
        assert!(!strict_fields_complete(Some("2"), Some("neg"), None));
        assert!(!strict_fields_complete(Some("3"), Some("neg"), Some("  ")));
        assert!(!strict_fields_complete(None, Some("pos"), None));
        assert!(!strict_fields_complete(Some("1"), None, None));
        assert!(!strict_fields_complete(Some(""), Some("pos"), None));
    }

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let record = RatingRecord {
            item_index: 3,
            id: Some(ItemId::Text("a".into())),
            uid: None,
            category: Some("1".into()),
            valence: Some("pos".into()),
            subcategory: None,
            flagged: false,
            too_short: false,
            promotional: true,
            engagement: false,
            is_complete: true,
            rater_id: Some("r1".into()),
            timestamp: "2025-01-20T10:00:00-05:00".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["itemIndex"], 3);
        assert_eq!(json["tooShort"], false);
        assert_eq!(json["isComplete"], true);
        assert_eq!(json["raterId"], "r1");
        assert!(json["uid"].is_null());
    }

    #[test]
    fn test_record_key_matches_item_key() {
        let record: RatingRecord =
            serde_json::from_str(r#"{"itemIndex": 4, "id": null, "uid": "u"}"#).unwrap();
        assert_eq!(record.key().as_str(), "4|u");
        assert!(!record.is_complete);
    }
}
