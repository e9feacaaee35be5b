//! Reset command: drop every stored rating.

use std::path::PathBuf;

use serde::Serialize;

use super::open_labeller;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct ResetOutput {
    dropped: usize,
    dataset_size: usize,
}

/// Execute the reset command. The dataset and cursor are kept.
///
/// # Errors
///
/// Returns `InvalidArgument` without `--yes`, or a storage error.
pub fn execute(
    yes: bool,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    if !yes {
        return Err(Error::InvalidArgument(
            "reset deletes every rating; pass --yes to confirm".to_string(),
        ));
    }

    let mut labeller = open_labeller(db_path, timezone)?;
    let dropped = labeller.reset_ratings()?;

    if json {
        let output = ResetOutput {
            dropped,
            dataset_size: labeller.items().len(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted {dropped} ratings and the rater id.");
    }
    Ok(())
}
