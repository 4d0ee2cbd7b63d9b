//! Deterministic cache key derivation: `md5(canonical_json({type, params}))`
//! (spec.md §3, "Cache entry"). Canonicalization sorts object keys
//! recursively so that `{a:1,b:2}` and `{b:2,a:1}` derive the same key.

use md5::{Digest, Md5};
use serde_json::Value;

/// Recursively sort object keys so two semantically-equal JSON values always
/// serialize identically, regardless of insertion order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(String, Value)> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Derive the cache key for a `{type, params}` pair.
pub fn cache_key(entry_type: &str, params: &Value) -> String {
    let envelope = serde_json::json!({
        "type": entry_type,
        "params": canonicalize(params),
    });
    let serialized = envelope.to_string();
    let digest = Md5::digest(serialized.as_bytes());
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
