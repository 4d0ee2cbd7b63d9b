//! Cache entry shape (spec.md §3 "Cache entry").

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::SystemTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub params: Value,
    pub cached_at: SystemTime,
    pub expires_at: SystemTime,
}
