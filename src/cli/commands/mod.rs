//! Command implementations.

pub mod completions;
pub mod export;
pub mod history;
pub mod import;
pub mod init;
pub mod list;
pub mod load;
pub mod progress;
pub mod rate;
pub mod rater;
pub mod reset;
pub mod status;
pub mod version;

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::{resolve_db_path, resolve_timezone};
use crate::error::{Error, Result};
use crate::session::{Labeller, Progress};
use crate::storage::SqliteStorage;

/// Resolve the database path, failing if the store was never initialized.
fn existing_db_path(db_path: Option<&PathBuf>) -> Result<PathBuf> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }
    Ok(db_path)
}

/// Open the existing store.
fn open_storage(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = existing_db_path(db_path)?;
    SqliteStorage::open(&db_path)
}

/// Open the store and restore the labelling session from it.
fn open_labeller(
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
) -> Result<Labeller<SqliteStorage>> {
    let clock = resolve_timezone(timezone)?;
    let storage = open_storage(db_path)?;
    Ok(Labeller::open(storage, clock))
}

/// `[████████░░░░░░░░] 1/2 (50%)`
fn progress_line(progress: &Progress) -> String {
    const WIDTH: usize = 20;
    let filled = if progress.total == 0 {
        0
    } else {
        (progress.done * WIDTH / progress.total).min(WIDTH)
    };
    let bar = format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(WIDTH - filled).dimmed()
    );
    format!(
        "[{bar}] {}/{} ({}%)",
        progress.done, progress.total, progress.percent
    )
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
