//! Form bridge: the mapping between editable form values and stored
//! rating records.
//!
//! The UI layer only renders [`FormValues`] and collects [`FormOverrides`];
//! everything about what a record looks like lives here.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{strict_fields_complete, Item, RatingRecord};
use crate::validate::{normalize_category, normalize_valence, requires_subcategory};

/// Current state of the rating form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormValues {
    pub category: Option<String>,
    pub valence: Option<String>,
    pub subcategory: Option<String>,
    pub flagged: bool,
    pub too_short: bool,
    pub promotional: bool,
    pub engagement: bool,
}

impl FormValues {
    /// Render a saved record into the form, or the empty form.
    #[must_use]
    pub fn from_record(record: Option<&RatingRecord>) -> Self {
        record.map_or_else(Self::default, |r| Self {
            category: r.category.clone(),
            valence: r.valence.clone(),
            subcategory: r.subcategory.clone(),
            flagged: r.flagged,
            too_short: r.too_short,
            promotional: r.promotional,
            engagement: r.engagement,
        })
    }

    /// Whether the subcategory field applies to the selected category.
    #[must_use]
    pub fn needs_subcategory(&self) -> bool {
        self.category.as_deref().is_some_and(requires_subcategory)
    }

    /// Check the fields a strict save requires.
    ///
    /// A too-short item is always valid.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first missing field.
    pub fn validate_strict(&self) -> Result<()> {
        if self.too_short {
            return Ok(());
        }
        if blank(self.category.as_deref()) {
            return Err(Error::Validation {
                field: "category",
                message: "Select a category before saving".to_string(),
            });
        }
        if blank(self.valence.as_deref()) {
            return Err(Error::Validation {
                field: "valence",
                message: "Select a valence before saving".to_string(),
            });
        }
        if self.needs_subcategory() && blank(self.subcategory.as_deref()) {
            return Err(Error::Validation {
                field: "subcategory",
                message: format!(
                    "Category {} needs a subcategory",
                    self.category.as_deref().unwrap_or_default()
                ),
            });
        }
        Ok(())
    }

    /// Assemble the record to store for `item` at `index`.
    ///
    /// Too-short items drop category, valence and subcategory. A
    /// subcategory is only kept when the category calls for one.
    #[must_use]
    pub fn build_record(
        &self,
        item: &Item,
        index: usize,
        rater_id: Option<String>,
        timestamp: String,
    ) -> RatingRecord {
        let (category, valence, subcategory) = if self.too_short {
            (None, None, None)
        } else {
            let subcategory = self
                .subcategory
                .clone()
                .filter(|_| self.needs_subcategory());
            (self.category.clone(), self.valence.clone(), subcategory)
        };

        let is_complete = self.too_short
            || strict_fields_complete(
                category.as_deref(),
                valence.as_deref(),
                subcategory.as_deref(),
            );

        RatingRecord {
            item_index: index,
            id: item.id.clone(),
            uid: item.uid.clone(),
            category,
            valence,
            subcategory,
            flagged: self.flagged,
            too_short: self.too_short,
            promotional: self.promotional,
            engagement: self.engagement,
            is_complete,
            rater_id,
            timestamp,
        }
    }
}

fn blank(v: Option<&str>) -> bool {
    v.is_none_or(|s| s.trim().is_empty())
}

/// Edits to apply on top of the rendered form.
///
/// `None` leaves a field as rendered. For text fields, `Some("")` or
/// `Some("none")` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOverrides {
    pub category: Option<String>,
    pub valence: Option<String>,
    pub subcategory: Option<String>,
    pub flagged: Option<bool>,
    pub too_short: Option<bool>,
    pub promotional: Option<bool>,
    pub engagement: Option<bool>,
}

impl FormOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay these edits onto `form`, normalizing category and valence.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown category or valence; the
    /// form is left untouched in that case.
    pub fn apply(&self, form: &FormValues) -> Result<FormValues> {
        let mut next = form.clone();

        if let Some(raw) = &self.category {
            next.category = match cleared(raw) {
                None => None,
                Some(v) => Some(normalize_category(v).map_err(|(input, hint)| {
                    invalid("category", &input, hint)
                })?),
            };
        }
        if let Some(raw) = &self.valence {
            next.valence = match cleared(raw) {
                None => None,
                Some(v) => Some(
                    normalize_valence(v).map_err(|(input, hint)| invalid("valence", &input, hint))?,
                ),
            };
        }
        if let Some(raw) = &self.subcategory {
            next.subcategory = cleared(raw).map(|s| s.trim().to_string());
        }

        if let Some(v) = self.flagged {
            next.flagged = v;
        }
        if let Some(v) = self.too_short {
            next.too_short = v;
        }
        if let Some(v) = self.promotional {
            next.promotional = v;
        }
        if let Some(v) = self.engagement {
            next.engagement = v;
        }

        Ok(next)
    }
}

fn cleared(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed)
    }
}

fn invalid(field: &str, input: &str, hint: Option<String>) -> Error {
    match hint {
        Some(h) => Error::InvalidArgument(format!("unknown {field} '{input}' ({h})")),
        None => Error::InvalidArgument(format!("unknown {field} '{input}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item() -> Item {
        Item::sanitize(&json!({"id": 1, "content": "a"}))
    }

    fn form(category: Option<&str>, valence: Option<&str>, sub: Option<&str>) -> FormValues {
        FormValues {
            category: category.map(String::from),
            valence: valence.map(String::from),
            subcategory: sub.map(String::from),
            ..FormValues::default()
        }
    }

    #[test]
    fn test_complete_record() {
        let r = form(Some("2"), Some("pos"), Some("x")).build_record(&item(), 0, None, "t".into());
        assert!(r.is_complete);
        assert_eq!(r.subcategory.as_deref(), Some("x"));
        assert_eq!(r.item_index, 0);
    }

    #[test]
    fn test_partial_record_is_incomplete() {
        let r = form(Some("2"), Some("pos"), None).build_record(&item(), 0, None, "t".into());
        assert!(!r.is_complete);
        let r = FormValues::default().build_record(&item(), 1, None, "t".into());
        assert!(!r.is_complete);
        assert_eq!(r.category, None);
    }

    #[test]
    fn test_too_short_forces_nulls_and_completes() {
        let mut f = form(Some("1"), Some("neg"), Some("stale"));
        f.too_short = true;
        let r = f.build_record(&item(), 0, Some("r1".into()), "t".into());
        assert_eq!(r.category, None);
        assert_eq!(r.valence, None);
        assert_eq!(r.subcategory, None);
        assert!(r.too_short);
        assert!(r.is_complete);
        assert_eq!(r.rater_id.as_deref(), Some("r1"));
    }

    #[test]
    fn test_subcategory_dropped_when_not_applicable() {
        let r = form(Some("1"), Some("pos"), Some("x")).build_record(&item(), 0, None, "t".into());
        assert_eq!(r.subcategory, None);
        assert!(r.is_complete);
    }

    #[test]
    fn test_validate_strict_order() {
        let err = FormValues::default().validate_strict().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "category", .. }));

        let err = form(Some("1"), None, None).validate_strict().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "valence", .. }));

        let err = form(Some("3"), Some("pos"), Some(" ")).validate_strict().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "subcategory", .. }));

        assert!(form(Some("3"), Some("pos"), Some("x")).validate_strict().is_ok());

        let mut short = FormValues::default();
        short.too_short = true;
        assert!(short.validate_strict().is_ok());
    }

    #[test]
    fn test_render_round_trip() {
        let mut f = form(Some("2"), Some("neu"), Some("y"));
        f.engagement = true;
        let r = f.build_record(&item(), 0, None, "t".into());
        assert_eq!(FormValues::from_record(Some(&r)), f);
        assert_eq!(FormValues::from_record(None), FormValues::default());
    }

    #[test]
    fn test_overrides_apply_and_clear() {
        let base = form(Some("2"), Some("pos"), Some("x"));
        let edits = FormOverrides {
            category: Some("c3".into()),
            valence: Some("negative".into()),
            subcategory: Some("none".into()),
            flagged: Some(true),
            ..FormOverrides::default()
        };
        let next = edits.apply(&base).unwrap();
        assert_eq!(next.category.as_deref(), Some("3"));
        assert_eq!(next.valence.as_deref(), Some("neg"));
        assert_eq!(next.subcategory, None);
        assert!(next.flagged);
        assert!(!next.too_short);
    }

    #[test]
    fn test_overrides_reject_unknown_values() {
        let edits = FormOverrides {
            valence: Some("sideways".into()),
            ..FormOverrides::default()
        };
        let err = edits.apply(&FormValues::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("valence")));
        assert!(FormOverrides::default().is_empty());
    }
}
