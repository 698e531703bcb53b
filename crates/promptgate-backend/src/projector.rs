//! Backend response projection
//!
//! Reduces the backend's JSON response to `response` plus the fields named
//! in the allowlist.

use crate::error::{BackendError, Result};
use serde_json::{Map, Value};

/// Field that is always present in the projected output
pub const RESPONSE_KEY: &str = "response";

/// Project a raw backend response body
///
/// - `response` is always included (empty string when absent or not a string)
/// - allowlisted fields are copied verbatim when present, silently omitted otherwise
/// - with `strip_newlines`, every `\n` in `response` becomes a space; other
///   fields are never touched
///
/// Fails with [`BackendError::Decode`] when the body is not a JSON object.
pub fn project(raw: &[u8], allowlist: &[String], strip_newlines: bool) -> Result<Map<String, Value>> {
    let backend: Map<String, Value> =
        serde_json::from_slice(raw).map_err(|e| BackendError::Decode(e.to_string()))?;

    let mut filtered = Map::new();

    for field in allowlist {
        if field == RESPONSE_KEY {
            continue;
        }
        if let Some(value) = backend.get(field) {
            filtered.insert(field.clone(), value.clone());
        }
    }

    let response = response_text(&backend);
    let response = if strip_newlines {
        response.replace('\n', " ")
    } else {
        response.to_string()
    };
    filtered.insert(RESPONSE_KEY.to_string(), Value::String(response));

    Ok(filtered)
}

fn response_text(backend: &Map<String, Value>) -> &str {
    backend
        .get(RESPONSE_KEY)
        .and_then(Value::as_str)
        .unwrap_or_default()
}
