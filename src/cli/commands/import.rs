//! Import command: merge an export file back into the store.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{display_path, open_labeller, progress_line};
use crate::error::Result;
use crate::session::Progress;
use crate::transfer::{read_export, ImportStats, MergeStrategy};

#[derive(Serialize)]
struct ImportOutput {
    file: String,
    strategy: &'static str,
    #[serde(flatten)]
    stats: ImportStats,
    progress: Progress,
}

/// Execute the import command.
///
/// # Errors
///
/// Returns `FileNotFound`, `InvalidDataset` for a file that is not an
/// export, or a storage error.
pub fn execute(
    file: &Path,
    strategy: MergeStrategy,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;
    let payload = read_export(file)?;
    let source = display_path(file);

    let stats = labeller.import(&payload, strategy, &source)?;
    let progress = labeller.progress();

    if json {
        let output = ImportOutput {
            file: source,
            strategy: strategy.as_str(),
            stats,
            progress,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Imported {} ratings from {source}", stats.total());
        println!("  Created: {}", stats.created);
        println!("  Updated: {}", stats.updated);
        println!("  Skipped: {}", stats.skipped);
        println!("{}", progress_line(&progress));
    }
    Ok(())
}
