//! Audit event storage and retrieval.
//!
//! Events track every write-through to durable storage for debugging and
//! history.

use rusqlite::{Connection, Result};
use serde::Serialize;

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DatasetLoaded,
    CursorMoved,
    RatingSaved,
    RatingCleared,
    RaterChanged,
    RatingsImported,
    RatingsExported,
    StateReset,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatasetLoaded => "dataset_loaded",
            Self::CursorMoved => "cursor_moved",
            Self::RatingSaved => "rating_saved",
            Self::RatingCleared => "rating_cleared",
            Self::RaterChanged => "rater_changed",
            Self::RatingsImported => "ratings_imported",
            Self::RatingsExported => "ratings_exported",
            Self::StateReset => "state_reset",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "dataset_loaded" => Self::DatasetLoaded,
            "cursor_moved" => Self::CursorMoved,
            "rating_saved" => Self::RatingSaved,
            "rating_cleared" => Self::RatingCleared,
            "rater_changed" => Self::RaterChanged,
            "ratings_imported" => Self::RatingsImported,
            "ratings_exported" => Self::RatingsExported,
            "state_reset" => Self::StateReset,
            _ => return None,
        })
    }
}

/// An audit event record.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    /// What the event is about (`rating`, `dataset`, `session`).
    pub entity_type: String,
    /// Item key, dataset fingerprint, or storage key.
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type,
            actor: actor.to_string(),
            old_value: None,
            new_value: None,
            comment: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add old/new values for field change tracking.
    #[must_use]
    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    /// Add a comment to the event.
    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.old_value,
            event.new_value,
            event.comment,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get the most recent events, newest first.
///
/// Rows with an unrecognized event type are skipped.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn recent_events(conn: &Connection, limit: Option<u32>) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(50);
    let mut stmt = conn.prepare(
        "SELECT id, entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at
         FROM events
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], |row| {
        let Some(event_type) = EventType::parse(&row.get::<_, String>(3)?) else {
            return Ok(None);
        };
        Ok(Some(Event {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            event_type,
            actor: row.get(4)?,
            old_value: row.get(5)?,
            new_value: row.get(6)?,
            comment: row.get(7)?,
            created_at: row.get(8)?,
        }))
    })?;

    let mut events = Vec::new();
    for row in rows {
        if let Some(event) = row? {
            events.push(event);
        }
    }
    Ok(events)
}
