//! Content hashing for datasets.
//!
//! The working dataset is fingerprinted by hashing its serialized JSON, so
//! a reload of the same records can be recognized without comparing items.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Compute a SHA256 hash of a serializable value.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to JSON.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check if content changed against a previously stored hash.
///
/// Returns `true` when there is no stored hash.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}
