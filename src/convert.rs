//! Conversion utilities between protocol JSON and bridge types.
//!
//! Argument extraction helpers for tool dispatch, plus catalog entry
//! serialization for response payloads.

use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::store::CatalogEntry;

/// Serialize entries as a pretty-printed JSON array.
pub fn entries_to_pretty_json(entries: &[CatalogEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(McpError::from)
}

/// Get an optional string argument from JSON arguments.
///
/// Distinguishes absent from present: `Some("")` is a real value. A present
/// non-string is rejected rather than silently ignored.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: format!("expected a string, got {}", json_type_name(other)),
        }),
    }
}

/// Get an optional integer argument from JSON arguments.
pub fn get_optional_i64(args: &Map<String, JsonValue>, name: &str) -> Result<Option<i64>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| McpError::InvalidArg {
            name: name.to_string(),
            reason: format!("expected an integer, got {}", json_type_name(value)),
        }),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
