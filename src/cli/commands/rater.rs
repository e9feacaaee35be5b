//! Rater command: show or set the session rater id.

use std::path::PathBuf;

use serde::Serialize;

use super::open_labeller;
use crate::error::Result;

#[derive(Serialize)]
struct RaterOutput {
    rater_id: Option<String>,
    /// Stored ratings now carrying this rater id.
    ratings: usize,
    changed: bool,
}

/// Execute the rater command.
///
/// Setting the id restamps every stored rating with it.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written.
pub fn execute(
    id: Option<&str>,
    db_path: Option<&PathBuf>,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut labeller = open_labeller(db_path, timezone)?;

    let changed = match id {
        Some(id) => {
            labeller.set_rater_id(id)?;
            true
        }
        None => false,
    };

    let rater_id = labeller.store().rater_for_records();
    let ratings = labeller.store().len();

    if json {
        let output = RaterOutput {
            rater_id,
            ratings,
            changed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        match (rater_id, changed) {
            (Some(r), true) => println!("Rater set to {r} ({ratings} ratings restamped)"),
            (None, true) => println!("Rater cleared ({ratings} ratings restamped)"),
            (Some(r), false) => println!("Rater: {r}"),
            (None, false) => println!("No rater set. Set one with: ratedesk rater <id>"),
        }
    }
    Ok(())
}
