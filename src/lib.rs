//! ratedesk - a data-labelling desk for text records
//!
//! Loads a list of text records, presents them one at a time to a rater,
//! captures structured ratings, keeps progress in a local store, and
//! exports the accumulated ratings as JSON.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Item, ItemKey, RatingRecord)
//! - [`session`] - Rating store, progress, navigation, form bridge, controller
//! - [`storage`] - SQLite-backed key-value store with an audit trail
//! - [`transfer`] - Dataset loading and rating export/import
//! - [`timestamp`] - Zone-qualified timestamps
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod storage;
pub mod timestamp;
pub mod transfer;
pub mod validate;

pub use error::{Error, Result};

/// Global CSV output flag (set when `--format csv`).
pub static CSV_OUTPUT: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if CSV output is requested.
#[inline]
pub fn is_csv() -> bool {
    CSV_OUTPUT.load(std::sync::atomic::Ordering::Relaxed)
}

/// Escape a value for CSV output (wrap in quotes if it contains commas, quotes, or newlines).
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
