//! Dataset loading: local files and a sample fetched over HTTP.
//!
//! Source files are JSON arrays of loosely shaped records. Some exports
//! contain a bare `NaN` token where a value is missing, which is not
//! valid JSON; it is rewritten to `null` before parsing.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::Item;
use crate::transfer::file::read_text;

/// Sample dataset used by `load --sample` when no URL is configured.
pub const DEFAULT_SAMPLE_URL: &str = "http://127.0.0.1:8000/sample.json";

/// Replace bare `NaN` tokens outside string literals with `null`.
///
/// Only whole tokens are rewritten: `NaNa` or `xNaN` are left alone, and
/// so is anything between double quotes.
#[must_use]
pub fn rewrite_nan(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if bytes[i..].starts_with(b"NaN")
            && (i == 0 || !is_ident(bytes[i - 1]))
            && bytes.get(i + 3).is_none_or(|&n| !is_ident(n))
        {
            out.push_str(&text[last..i]);
            out.push_str("null");
            i += 3;
            last = i;
            continue;
        }
        i += 1;
    }

    out.push_str(&text[last..]);
    out
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parse dataset text into sanitized items.
///
/// # Errors
///
/// Returns `InvalidDataset` when the text is not valid JSON (after `NaN`
/// rewriting) or its root is not an array.
pub fn parse_dataset(text: &str) -> Result<Vec<Item>> {
    let value: Value = serde_json::from_str(&rewrite_nan(text))
        .map_err(|e| Error::InvalidDataset(format!("not valid JSON: {e}")))?;

    let Value::Array(records) = value else {
        return Err(Error::InvalidDataset(format!(
            "expected a JSON array of records, found {}",
            kind(&value)
        )));
    };

    Ok(records.iter().map(Item::sanitize).collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read and parse a dataset from a local file.
///
/// # Errors
///
/// Returns `FileNotFound`, an I/O error, or `InvalidDataset`.
pub fn read_dataset(path: &Path) -> Result<Vec<Item>> {
    let text = read_text(path)?;
    let items = parse_dataset(&text)?;
    info!(path = %path.display(), items = items.len(), "dataset read");
    Ok(items)
}

/// Fetch and parse a dataset over HTTP.
///
/// One GET, no retries.
///
/// # Errors
///
/// Returns `Fetch` for transport failures and non-success statuses, or
/// `InvalidDataset` if the body does not parse.
pub fn fetch_dataset(url: &str) -> Result<Vec<Item>> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;

    let text = rt.block_on(fetch_text(url))?;
    let items = parse_dataset(&text)?;
    info!(url, items = items.len(), "dataset fetched");
    Ok(items)
}

async fn fetch_text(url: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;

    let status = response.status();
    debug!(url, %status, "sample response");
    if !status.is_success() {
        return Err(Error::Fetch(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| Error::Fetch(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rewrite_bare_nan() {
        assert_eq!(
            rewrite_nan(r#"[{"id":1,"transcription":NaN}]"#),
            r#"[{"id":1,"transcription":null}]"#
        );
        assert_eq!(rewrite_nan("[NaN, NaN]"), "[null, null]");
    }

    #[test]
    fn test_rewrite_leaves_strings_alone() {
        let text = r#"[{"content":"NaN is not a number","uid":"a\"NaN"}]"#;
        assert_eq!(rewrite_nan(text), text);
    }

    #[test]
    fn test_rewrite_whole_tokens_only() {
        assert_eq!(rewrite_nan("[NaNa]"), "[NaNa]");
        assert_eq!(rewrite_nan("[xNaN]"), "[xNaN]");
    }

    #[test]
    fn test_parse_sanitizes() {
        let items =
            parse_dataset(r#"[{"id":1,"content":"a","transcription":NaN},{"uid":"u","content":5}]"#)
                .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, Some(ItemId::Number(1.into())));
        assert_eq!(items[0].transcription, None);
        assert_eq!(items[1].content, "");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_dataset(r#"{"id":1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidDataset(ref m) if m.contains("an object")));

        assert!(matches!(parse_dataset("[{"), Err(Error::InvalidDataset(_))));
    }

    #[test]
    fn test_read_dataset_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, r#"[{"id":"a","content":"x"}]"#).unwrap();

        let items = read_dataset(&path).unwrap();
        assert_eq!(items[0].content, "x");

        let missing = dir.path().join("missing.json");
        assert!(matches!(read_dataset(&missing), Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_fetch_unreachable() {
        let err = fetch_dataset("http://127.0.0.1:9/none.json").unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }
}
