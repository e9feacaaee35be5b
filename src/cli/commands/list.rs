//! List command: one row per dataset item.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::open_labeller;
use crate::error::Result;
use crate::session::Entry;

const PREVIEW_CHARS: usize = 60;

#[derive(Serialize)]
struct ListOutput {
    items: Vec<ListItem>,
    count: usize,
}

#[derive(Serialize)]
struct ListItem {
    position: usize,
    key: String,
    status: &'static str,
    current: bool,
    preview: String,
}

fn status(entry: &Entry<'_>) -> &'static str {
    match entry.record {
        None => "unrated",
        Some(r) if r.is_complete => "complete",
        Some(_) => "partial",
    }
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn execute(
    pending: bool,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let labeller = open_labeller(db_path, timezone)?;
    let cursor = labeller.navigator().cursor();

    let items: Vec<ListItem> = labeller
        .entries()
        .filter(|e| !pending || !e.is_complete())
        .map(|e| ListItem {
            position: e.index + 1,
            key: e.key.to_string(),
            status: status(&e),
            current: cursor == Some(e.index),
            preview: e.item.preview(PREVIEW_CHARS),
        })
        .collect();

    if crate::is_csv() {
        println!("position,key,status,preview");
        for i in &items {
            println!(
                "{},{},{},{}",
                i.position,
                crate::csv_escape(&i.key),
                i.status,
                crate::csv_escape(&i.preview)
            );
        }
    } else if json {
        let output = ListOutput {
            count: items.len(),
            items,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if items.is_empty() {
        if pending && !labeller.items().is_empty() {
            println!("Every item has a complete rating.");
        } else {
            println!("No items loaded.");
        }
    } else {
        for i in &items {
            let marker = if i.current { ">" } else { " " };
            let status = match i.status {
                "complete" => i.status.green(),
                "partial" => i.status.yellow(),
                _ => i.status.dimmed(),
            };
            println!("{marker} {:>4}  {:<9} {}", i.position, status, i.preview);
        }
    }
    Ok(())
}
