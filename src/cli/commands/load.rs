//! Load command: replace the working dataset.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{display_path, open_labeller, progress_line};
use crate::config::resolve_sample_url;
use crate::error::{Error, Result};
use crate::session::Progress;
use crate::transfer::{fetch_dataset, read_dataset};

#[derive(Serialize)]
struct LoadOutput {
    source: String,
    items: usize,
    fingerprint: Option<String>,
    position: Option<usize>,
    /// Ratings from earlier sessions that match the new items.
    progress: Progress,
}

/// Execute the load command.
///
/// A failed read or parse leaves the previous dataset, cursor and
/// ratings untouched.
///
/// # Errors
///
/// Returns `FileNotFound`, `InvalidDataset`, `Fetch`, or a storage error.
pub fn execute(
    file: Option<&Path>,
    sample: bool,
    url: Option<&str>,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;

    let (items, source) = match (file, sample) {
        (_, true) => {
            let url = resolve_sample_url(url)?;
            (fetch_dataset(&url)?, url)
        }
        (Some(path), false) => (read_dataset(path)?, display_path(path)),
        (None, false) => {
            return Err(Error::InvalidArgument(
                "pass a dataset file or --sample".to_string(),
            ));
        }
    };

    labeller.set_dataset(items, &source)?;
    let summary = labeller.summary();

    if json {
        let output = LoadOutput {
            source,
            items: summary.dataset_size,
            fingerprint: summary.fingerprint,
            position: summary.position,
            progress: summary.progress,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Loaded {} items from {source}", summary.dataset_size);
        if summary.progress.done > 0 {
            println!(
                "  {} items already rated from earlier sessions",
                summary.progress.done
            );
        }
        println!("  {}", progress_line(&summary.progress));
    }

    Ok(())
}
