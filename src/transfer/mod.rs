//! Moving data in and out of the workspace.
//!
//! - **Datasets**: JSON arrays from a file or the sample URL → sanitized items
//! - **Export**: rating store → `ratings_<rater>_<millis>.json`
//! - **Import**: export document → rating store, with merge strategies
//! - **Hashing**: SHA256 fingerprints of loaded datasets

mod dataset;
mod export;
mod file;
mod hash;
mod import;
mod types;

pub use dataset::{fetch_dataset, parse_dataset, read_dataset, rewrite_nan, DEFAULT_SAMPLE_URL};
pub use export::{export_filename, write_export, ExportPayload};
pub use file::{atomic_write, file_size, read_text};
pub use hash::{content_hash, has_changed};
pub use import::read_export;
pub use types::{ImportStats, MergeStrategy};
