//! Export command.

use std::path::PathBuf;

use serde::Serialize;

use super::{display_path, open_labeller};
use crate::config::default_export_dir;
use crate::error::Result;
use crate::transfer::{file_size, write_export};

#[derive(Serialize)]
struct ExportOutput {
    path: String,
    rater_id: Option<String>,
    dataset_size: usize,
    ratings: usize,
    bytes: u64,
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn execute(
    output: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;
    let dir = match output {
        Some(dir) => dir.clone(),
        None => default_export_dir()?,
    };

    let payload = labeller.export_payload();
    let millis = chrono::Utc::now().timestamp_millis();
    let path = write_export(&payload, &dir, millis)?;
    let path_str = display_path(&path);
    labeller.record_export(&path_str, payload.ratings.len())?;

    if json {
        let output = ExportOutput {
            bytes: file_size(&path),
            path: path_str,
            rater_id: payload.rater_id,
            dataset_size: payload.dataset_size,
            ratings: payload.ratings.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Exported {} ratings to {path_str}", payload.ratings.len());
    }
    Ok(())
}
