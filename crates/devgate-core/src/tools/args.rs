//! Argument extraction helpers shared by every tool handler. The router
//! treats `arguments` as an untyped JSON object (spec.md §3); each handler
//! pulls out the keys it needs and converts a missing/malformed value into
//! `InvalidInput` up front, before any validation or I/O.

use crate::error::GatewayError;
use devgate_commons::ident::{clamp_limit, is_valid_query, MAX_RESULT_LIMIT};
use serde_json::Value;

pub fn require_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, GatewayError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| GatewayError::invalid_input(format!("`{key}` must be a non-empty string")))
}

pub fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

pub fn optional_bool(arguments: &Value, key: &str) -> bool {
    arguments.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// A caller-supplied `limit`, clamped to `[1, MAX_RESULT_LIMIT]` (spec.md
/// §4.1). Returns `None` when the argument is absent, so callers can decide
/// whether an absent limit means "use a default" or "omit the argument".
pub fn clamp_optional_limit(arguments: &Value, key: &str) -> Option<i64> {
    arguments
        .get(key)
        .and_then(Value::as_i64)
        .map(|raw| clamp_limit(raw, MAX_RESULT_LIMIT))
}

/// Validate a query string's length bound (spec.md §8: "Query length 10,000
/// passes; 10,001 fails").
pub fn require_query<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, GatewayError> {
    let query = require_str(arguments, key)?;
    if !is_valid_query(query) {
        return Err(GatewayError::invalid_input(format!(
            "`{key}` exceeds the maximum query length"
        )));
    }
    Ok(query)
}

pub fn require_project_id<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, GatewayError> {
    let id = require_str(arguments, key)?;
    if !devgate_commons::ident::is_valid_project_id(id) {
        return Err(GatewayError::invalid_input(format!(
            "`{key}` is not a valid project id"
        )));
    }
    Ok(id)
}
