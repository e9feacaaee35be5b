//! SQLite storage implementation.
//!
//! This module provides the durable backend for ratedesk using SQLite.
//! It follows the `MutationContext` pattern: each write runs inside one
//! IMMEDIATE transaction together with its audit events.

use crate::error::Result;
use crate::storage::events::{insert_event, recent_events, Event};
use crate::storage::schema::apply_schema;
use crate::storage::StateBackend;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, collecting audit events to write
/// before commit.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event for this operation.
    pub fn record(&mut self, event: Option<&Event>) {
        self.events.extend(event.cloned());
    }
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist. Writers
    /// wait up to five seconds for a competing lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;
        tracing::debug!(op = %ctx.op_name, events = ctx.events.len(), "committed");

        Ok(result)
    }

    /// Most recent audit events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_events(&self, limit: Option<u32>) -> Result<Vec<Event>> {
        Ok(recent_events(&self.conn, limit)?)
    }

    /// Number of stored keys (for status output).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn key_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl StateBackend for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str, event: Option<&Event>) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("write", |tx, ctx| {
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value, now],
            )?;
            ctx.record(event);
            Ok(())
        })
    }

    fn remove(&mut self, key: &str, event: Option<&Event>) -> Result<()> {
        self.mutate("remove", |tx, ctx| {
            tx.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
            ctx.record(event);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EventType;

    #[test]
    fn test_open_memory() {
        let storage = SqliteStorage::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_write_read_overwrite() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        assert_eq!(storage.read("state").unwrap(), None);

        storage.write("state", r#"{"a":1}"#, None).unwrap();
        storage.write("state", r#"{"a":2}"#, None).unwrap();

        assert_eq!(storage.read("state").unwrap().as_deref(), Some(r#"{"a":2}"#));
        assert_eq!(storage.key_count().unwrap(), 1);
    }

    #[test]
    fn test_write_records_event_in_same_transaction() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let event = Event::new("rating", "1|", EventType::RatingSaved, "r1");

        storage.write("state", "{}", Some(&event)).unwrap();

        let events = storage.recent_events(None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_id, "1|");
    }

    #[test]
    fn test_remove() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.write("state", "{}", None).unwrap();
        storage
            .remove(
                "state",
                Some(&Event::new("session", "state", EventType::StateReset, "r1")),
            )
            .unwrap();
        assert_eq!(storage.read("state").unwrap(), None);
        assert_eq!(storage.recent_events(None).unwrap().len(), 1);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ratedesk.db");

        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage.write("state", "persisted", None).unwrap();
        }

        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.read("state").unwrap().as_deref(), Some("persisted"));
    }
}
