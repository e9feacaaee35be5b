//! Progress command.

use std::path::PathBuf;

use serde::Serialize;

use super::{open_labeller, progress_line};
use crate::error::Result;
use crate::session::Progress;

#[derive(Serialize)]
struct ProgressOutput {
    #[serde(flatten)]
    progress: Progress,
    remaining: usize,
}

/// Execute the progress command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn execute(db_path: Option<&PathBuf>, timezone: Option<&str>, json: bool) -> Result<()> {
    let labeller = open_labeller(db_path, timezone)?;
    let progress = labeller.progress();

    if crate::is_csv() {
        println!("done,total,percent");
        println!("{},{},{}", progress.done, progress.total, progress.percent);
    } else if json {
        let output = ProgressOutput {
            progress,
            remaining: progress.remaining(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", progress_line(&progress));
        if progress.total > 0 {
            println!("  {} remaining", progress.remaining());
        }
    }
    Ok(())
}
