//! Error types for ratedesk.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ratedesk operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    NoDataset,
    FileNotFound,

    // Validation (exit 4)
    InvalidArgument,
    RequiredField,
    JumpOutOfRange,

    // Transfer (exit 6)
    InvalidDataset,
    FetchError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NoDataset => "NO_DATASET",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::RequiredField => "REQUIRED_FIELD",
            Self::JumpOutOfRange => "JUMP_OUT_OF_RANGE",
            Self::InvalidDataset => "INVALID_DATASET",
            Self::FetchError => "FETCH_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::NoDataset | Self::FileNotFound => 3,
            Self::InvalidArgument | Self::RequiredField | Self::JumpOutOfRange => 4,
            Self::InvalidDataset | Self::FetchError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry with corrected input.
    ///
    /// True for validation errors (missing field, bad value, out-of-range
    /// jump). False for not-found, I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::RequiredField | Self::JumpOutOfRange | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in ratedesk operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `ratedesk init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("No dataset loaded")]
    NoDataset,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("{message}")]
    Validation {
        /// Form field that failed (`category`, `valence`, `subcategory`).
        field: &'static str,
        message: String,
    },

    #[error("Position {position} is out of range (1-{len})")]
    JumpOutOfRange { position: i64, len: usize },

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::NoDataset => ErrorCode::NoDataset,
            Self::FileNotFound { .. } => ErrorCode::FileNotFound,
            Self::Validation { .. } => ErrorCode::RequiredField,
            Self::JumpOutOfRange { .. } => ErrorCode::JumpOutOfRange,
            Self::InvalidDataset(_) => ErrorCode::InvalidDataset,
            Self::Fetch(_) => ErrorCode::FetchError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for humans and scripts.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `ratedesk init` to create the local store".to_string())
            }

            Self::AlreadyInitialized { path } => Some(format!(
                "Store already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::NoDataset => Some(
                "Load records first.\n  \
                 From a file: ratedesk load records.json\n  \
                 Sample set:  ratedesk load --sample"
                    .to_string(),
            ),

            Self::FileNotFound { path } => {
                Some(format!("Check the path '{}' and try again.", path.display()))
            }

            Self::Validation { field, .. } => Some(match *field {
                "category" => format!(
                    "Pass --category with one of: {}",
                    crate::validate::CATEGORIES
                        .iter()
                        .map(|c| c.code)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                "valence" => format!(
                    "Pass --valence with one of: {}",
                    crate::validate::VALID_VALENCES.join(", ")
                ),
                _ => "Pass --subcategory, or mark the item with --too-short true".to_string(),
            }),

            Self::JumpOutOfRange { len, .. } => {
                Some(format!("Positions are 1-based: use a value from 1 to {len}."))
            }

            Self::InvalidDataset(_) => Some(
                "Input must be a JSON array of objects with `id`/`uid`, `content`, `transcription`."
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("valence") {
                    Some(format!(
                        "Valid valences: {}. Synonyms: positive→pos, negative→neg, neutral→neu",
                        crate::validate::VALID_VALENCES.join(", ")
                    ))
                } else if msg.contains("category") {
                    Some("Valid categories: 1, 2, 3, 4 (2 and 3 need a subcategory)".to_string())
                } else {
                    None
                }
            }

            Self::Config(msg) if msg.contains("timezone") => Some(
                "Use an IANA zone name such as America/New_York or Europe/Berlin".to_string(),
            ),

            Self::Fetch(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
