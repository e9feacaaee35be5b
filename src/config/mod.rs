//! Configuration management.
//!
//! Resolves where the database lives, which timezone stamps ratings, and
//! where the sample dataset is fetched from.
//!
//! # Layout
//!
//! - **Database**: `~/.ratedesk/data/ratedesk.db` unless overridden
//! - **Test database**: `~/.ratedesk/test/ratedesk.db` when `RATEDESK_TEST_DB` is set
//! - **Exports**: written to the current directory unless `--output` is given

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::timestamp::{TimestampFormatter, DEFAULT_TIMEZONE};
use crate::transfer::DEFAULT_SAMPLE_URL;

/// Get the global ratedesk directory location (`~/.ratedesk/`).
#[must_use]
pub fn global_ratedesk_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ratedesk"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `RATEDESK_TEST_DB=1` (or any value
/// other than empty, `0`, or `false`).
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("RATEDESK_TEST_DB").is_ok_and(|v| truthy(&v))
}

fn truthy(v: &str) -> bool {
    !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
}

/// Get the test database path: `~/.ratedesk/test/ratedesk.db`.
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_ratedesk_dir().map(|dir| dir.join("test").join("ratedesk.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` or `RATEDESK_DB`), use it
/// 2. `RATEDESK_TEST_DB` → the test database
/// 3. Global location: `~/.ratedesk/data/ratedesk.db`
///
/// Returns `None` if no home directory can be found.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_ratedesk_dir().map(|dir| dir.join("data").join("ratedesk.db"))
}

/// Build the timestamp formatter for an IANA zone name, or the default zone.
///
/// # Errors
///
/// Returns a `Config` error for an unknown zone name.
pub fn resolve_timezone(name: Option<&str>) -> Result<TimestampFormatter> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => TimestampFormatter::from_name(name),
        None => TimestampFormatter::from_name(DEFAULT_TIMEZONE),
    }
}

/// Resolve the sample dataset URL.
///
/// Priority: explicit `--url`, then `RATEDESK_SAMPLE_URL`, then the
/// built-in default.
///
/// # Errors
///
/// Returns a `Config` error when the chosen value is not an http(s) URL.
pub fn resolve_sample_url(explicit: Option<&str>) -> Result<String> {
    let url = explicit
        .map(str::to_string)
        .or_else(|| {
            std::env::var("RATEDESK_SAMPLE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
        })
        .unwrap_or_else(|| DEFAULT_SAMPLE_URL.to_string());

    let url = url.trim().to_string();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(Error::Config(format!(
            "sample URL must start with http:// or https://, got '{url}'"
        )))
    }
}

/// Directory exports go to when `--output` is not given.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read.
pub fn default_export_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}
