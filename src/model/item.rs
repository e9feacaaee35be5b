//! Item model: one unit of content to be rated.
//!
//! Raw dataset records have arbitrary shape. [`Item::sanitize`] coerces
//! them into a well-formed item and [`ItemKey::derive`] gives each one a
//! stable identity for the rating store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An item identifier as it appeared in the source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A sanitized dataset record.
///
/// Immutable once loaded into the working dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub transcription: Option<String>,
}

impl Item {
    /// Coerce a raw record into an item. Never fails.
    ///
    /// - `id` survives when it is a string or a number
    /// - `uid` survives when it is a string (numbers are stringified)
    /// - `content` becomes `""` unless it is a string
    /// - `transcription` becomes `None` unless it is a string
    ///
    /// Anything that is not an object yields an empty item.
    #[must_use]
    pub fn sanitize(raw: &Value) -> Self {
        let field = |name: &str| raw.as_object().and_then(|o| o.get(name));

        let id = match field("id") {
            Some(Value::String(s)) => Some(ItemId::Text(s.clone())),
            Some(Value::Number(n)) => Some(ItemId::Number(n.clone())),
            _ => None,
        };

        let uid = match field("uid") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let content = match field("content") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };

        let transcription = match field("transcription") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Self {
            id,
            uid,
            content,
            transcription,
        }
    }

    /// Short single-line preview of the content for listings.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let flat: String = self
            .content
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        if flat.chars().count() > max_chars {
            let cut: String = flat.chars().take(max_chars).collect();
            format!("{cut}...")
        } else {
            flat
        }
    }
}

/// Identity key of an item in the rating store: `"<id-or-index>|<uid-or-empty>"`.
///
/// Two items with the same `id` and `uid` share a key, which lets ratings
/// re-attach when the same dataset is loaded again. Items without an `id`
/// fall back to their position, so their keys only survive reloads of a
/// dataset with the same order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    /// Derive the key for an item at `fallback_index`.
    #[must_use]
    pub fn derive(item: &Item, fallback_index: usize) -> Self {
        Self::from_parts(item.id.as_ref(), item.uid.as_deref(), fallback_index)
    }

    /// Derive a key from loose parts (used for exported rating records).
    #[must_use]
    pub fn from_parts(id: Option<&ItemId>, uid: Option<&str>, fallback_index: usize) -> Self {
        let head = id.map_or_else(|| fallback_index.to_string(), ToString::to_string);
        Self(format!("{head}|{}", uid.unwrap_or("")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}
