//! History command: recent audit events.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use super::open_storage;
use crate::config::resolve_timezone;
use crate::error::Result;
use crate::storage::Event;

#[derive(Serialize)]
struct HistoryOutput {
    events: Vec<Event>,
    count: usize,
}

/// Execute the history command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried.
pub fn execute(
    limit: u32,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let clock = resolve_timezone(timezone)?;
    let storage = open_storage(db_path)?;
    let events = storage.recent_events(Some(limit))?;

    let when = |e: &Event| {
        DateTime::<Utc>::from_timestamp_millis(e.created_at)
            .map_or_else(|| e.created_at.to_string(), |t| clock.format(t))
    };

    if crate::is_csv() {
        println!("time,event,entity,actor,comment");
        for e in &events {
            println!(
                "{},{},{},{},{}",
                when(e),
                e.event_type.as_str(),
                crate::csv_escape(&e.entity_id),
                crate::csv_escape(&e.actor),
                crate::csv_escape(e.comment.as_deref().unwrap_or(""))
            );
        }
    } else if json {
        let output = HistoryOutput {
            count: events.len(),
            events,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if events.is_empty() {
        println!("No history yet.");
    } else {
        for e in &events {
            let comment = e
                .comment
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default();
            println!(
                "{} {:<16} {} {}{}",
                when(e).dimmed(),
                e.event_type.as_str(),
                e.entity_id,
                format!("by {}", e.actor).dimmed(),
                comment
            );
        }
    }
    Ok(())
}
