//! Status command implementation.

use std::path::PathBuf;

use serde::Serialize;

use super::{existing_db_path, progress_line};
use crate::config::resolve_timezone;
use crate::error::Result;
use crate::session::{Labeller, SessionSummary};
use crate::storage::SqliteStorage;

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    database: PathBuf,
    stored_keys: usize,
    #[serde(flatten)]
    session: SessionSummary,
}

/// Execute status command.
///
/// # Errors
///
/// Returns `NotInitialized` if the store does not exist.
pub fn execute(db_path: Option<&PathBuf>, timezone: Option<&str>, json: bool) -> Result<()> {
    let db_path = existing_db_path(db_path)?;
    let clock = resolve_timezone(timezone)?;
    let storage = SqliteStorage::open(&db_path)?;
    let stored_keys = storage.key_count()?;
    let labeller = Labeller::open(storage, clock);
    let s = labeller.summary();

    if json {
        let output = StatusOutput {
            database: db_path,
            stored_keys,
            session: s,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("ratedesk status");
    println!("===============");
    println!();
    println!("Database: {}", db_path.display());
    println!("Timezone: {}", s.timezone);
    println!("Rater:    {}", s.rater_id.as_deref().unwrap_or("(not set)"));
    println!();

    if s.dataset_size == 0 {
        println!("No dataset loaded.");
        println!();
        println!("Load one with: ratedesk load <records.json>");
    } else {
        println!(
            "Dataset:  {} items from {}",
            s.dataset_size,
            s.source.as_deref().unwrap_or("unknown source")
        );
        if let Some(loaded) = &s.loaded_at {
            println!("  Loaded: {loaded}");
        }
        if let Some(fp) = &s.fingerprint {
            println!("  Fingerprint: {}", &fp[..fp.len().min(12)]);
        }
        if let Some(pos) = s.position {
            println!("Position: {pos} of {}", s.dataset_size);
        }
    }

    println!();
    println!("Stored ratings: {}", s.stored_ratings);
    println!("{}", progress_line(&s.progress));
    if let Some(path) = &s.last_export {
        println!("Last export: {path}");
    }

    Ok(())
}
