//! Durable storage for ratedesk.
//!
//! State lives under a handful of string keys, each holding one JSON
//! document (the same shape browser local storage would hold). Every
//! write goes through a [`StateBackend`], which persists the value and
//! its audit event together.
//!
//! # Submodules
//!
//! - [`events`] - Audit event storage
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite backend

pub mod events;
pub mod schema;
pub mod sqlite;

pub use events::{Event, EventType};
pub use sqlite::SqliteStorage;

use crate::error::Result;
use std::collections::HashMap;

/// Storage key holding `{ ratingsById, raterId }`.
pub const RATINGS_STATE_KEY: &str = "ratings_state_v1";

/// Storage key holding the working dataset and navigation cursor.
pub const WORKSPACE_KEY: &str = "workspace_v1";

/// Key-value persistence used for write-through.
pub trait StateBackend {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value, and record
    /// `event` alongside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; nothing is written in that case.
    fn write(&mut self, key: &str, value: &str, event: Option<&Event>) -> Result<()>;

    /// Remove `key` and record `event`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn remove(&mut self, key: &str, event: Option<&Event>) -> Result<()>;
}

/// In-process backend with no durability (tests and dry runs).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
    events: Vec<Event>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str, event: Option<&Event>) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.events.extend(event.cloned());
        Ok(())
    }

    fn remove(&mut self, key: &str, event: Option<&Event>) -> Result<()> {
        self.values.remove(key);
        self.events.extend(event.cloned());
        Ok(())
    }
}
