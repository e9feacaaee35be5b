//! Import of previously exported rating documents.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::transfer::export::ExportPayload;
use crate::transfer::file::read_text;

/// Read an export document from disk.
///
/// # Errors
///
/// Returns `FileNotFound`, an I/O error, or `InvalidDataset` when the file
/// is not an export document.
pub fn read_export(path: &Path) -> Result<ExportPayload> {
    let text = read_text(path)?;
    let payload: ExportPayload = serde_json::from_str(&text).map_err(|e| {
        Error::InvalidDataset(format!("{} is not a ratings export: {e}", path.display()))
    })?;
    debug!(path = %path.display(), ratings = payload.ratings.len(), "export read");
    Ok(payload)
}
