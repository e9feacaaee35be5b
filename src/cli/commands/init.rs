//! Initialize the local rating store.
//!
//! Creates `~/.ratedesk/data/ratedesk.db` (or the `--db` path, or the
//! test database when `RATEDESK_TEST_DB=1`) with its schema applied.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    reinitialized: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the store exists and `force` is not set,
/// or an error if the directory or database cannot be created.
pub fn execute(force: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("Could not determine the ratedesk directory".to_string()))?;

    let existed = db_path.exists();
    if existed && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    if existed {
        remove_database(&db_path)?;
    }

    // Opening applies the schema.
    SqliteStorage::open(&db_path)?;

    if json {
        let output = InitOutput {
            database: db_path,
            reinitialized: existed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        if existed {
            println!("Reinitialized ratedesk store");
        } else {
            println!("Initialized ratedesk store");
        }
        println!("  Database: {}", db_path.display());
        println!();
        println!("Next: ratedesk load <records.json>  (or: ratedesk load --sample)");
    }

    Ok(())
}

/// Remove the database file and its WAL companions.
fn remove_database(db_path: &Path) -> Result<()> {
    fs::remove_file(db_path)?;
    for suffix in ["-wal", "-shm"] {
        let mut companion = db_path.as_os_str().to_owned();
        companion.push(suffix);
        let companion = PathBuf::from(companion);
        if companion.exists() {
            fs::remove_file(companion)?;
        }
    }
    Ok(())
}
