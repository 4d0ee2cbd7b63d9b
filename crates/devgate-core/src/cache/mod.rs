//! Two-level TTL cache (spec.md §4.3, component C3): a process-memory map
//! backed by a disk tier for entries whose TTL exceeds
//! [`crate::ttl::DISK_PERSIST_THRESHOLD`].
//!
//! Grounded on `vtcode-core/src/cache/mod.rs`'s `UnifiedCache`/`CacheEntry`/
//! `CacheStats` shape for the memory tier; the disk tier and read-through
//! rehydration are new, added in the teacher's atomic-rename-write idiom
//! (write-to-tmp-then-rename, matched across `smart_edit` and metrics
//! persistence).

mod disk;
mod entry;
mod stats;

pub use entry::CacheEntry;
pub use stats::CacheStats;

use crate::ttl;
use devgate_commons::keys::cache_key;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// Where a cache hit was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Memory,
    Disk,
}

#[derive(Debug, Clone)]
pub struct CacheHit {
    pub value: Value,
    pub source: CacheSource,
}

struct Inner {
    memory: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// The two-level cache. Memory is authoritative when present; disk is used
/// only to warm a cold memory cache (spec.md §3 "Cache entry").
pub struct TtlCache {
    cache_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl TtlCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            inner: Mutex::new(Inner {
                memory: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// `get(type, params)` (spec.md §4.3). Expired hits are deleted from both
    /// tiers and reported as a miss; a disk hit rehydrates memory while
    /// preserving the original `expires_at` (never extending TTL on read).
    pub async fn get(&self, entry_type: &str, params: &Value) -> Option<CacheHit> {
        let key = cache_key(entry_type, params);
        let now = SystemTime::now();

        let mut guard = self.inner.lock().await;
        if let Some(entry) = guard.memory.get(&key).cloned() {
            if entry.expires_at <= now {
                guard.memory.remove(&key);
                drop(guard);
                let _ = disk::remove(&self.cache_dir, &key).await;
                self.record_miss().await;
                return None;
            }
            guard.hits += 1;
            return Some(CacheHit {
                value: entry.value,
                source: CacheSource::Memory,
            });
        }
        drop(guard);

        match disk::read(&self.cache_dir, &key).await {
            Some(entry) if entry.expires_at > now => {
                let mut guard = self.inner.lock().await;
                guard.hits += 1;
                guard.memory.insert(key, entry.clone());
                Some(CacheHit {
                    value: entry.value,
                    source: CacheSource::Disk,
                })
            }
            Some(_expired) => {
                let _ = disk::remove(&self.cache_dir, &key).await;
                self.record_miss().await;
                None
            }
            None => {
                self.record_miss().await;
                None
            }
        }
    }

    async fn record_miss(&self) {
        self.inner.lock().await.misses += 1;
    }

    /// `set(type, params, value, ttl?)` (spec.md §4.3). Always stored in
    /// memory; persisted to disk only when `ttl > 60s`. A disk write failure
    /// is non-fatal (spec.md §7).
    pub async fn set(&self, entry_type: &str, params: &Value, value: Value, ttl: Option<Duration>) {
        let key = cache_key(entry_type, params);
        let effective_ttl = ttl.unwrap_or_else(|| ttl::ttl_for_type(entry_type));
        let now = SystemTime::now();
        let entry = CacheEntry {
            key: key.clone(),
            value,
            entry_type: entry_type.to_string(),
            params: params.clone(),
            cached_at: now,
            expires_at: now + effective_ttl,
        };

        {
            let mut guard = self.inner.lock().await;
            guard.memory.insert(key.clone(), entry.clone());
        }

        if ttl::should_persist_to_disk(effective_ttl) {
            if let Err(error) = disk::write(&self.cache_dir, &entry).await {
                tracing::warn!(%error, key = %key, "cache disk persistence failed (non-fatal)");
            }
        }
    }

    /// `invalidate(pattern)` (spec.md §4.3). Deletes every entry whose
    /// `params.path` or `params.project` matches the predicate; for `path`,
    /// the pattern directory and every descendant are affected.
    pub async fn invalidate_path(&self, path: &Path) -> usize {
        let mut guard = self.inner.lock().await;
        let victims: Vec<String> = guard
            .memory
            .iter()
            .filter(|(_, entry)| entry_touches_path(entry, path))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &victims {
            guard.memory.remove(key);
        }
        drop(guard);

        let disk_victims = disk::remove_matching(&self.cache_dir, |entry| entry_touches_path(entry, path)).await;
        victims.len().max(disk_victims)
    }

    pub async fn invalidate_project(&self, project_id: &str) -> usize {
        let mut guard = self.inner.lock().await;
        let victims: Vec<String> = guard
            .memory
            .iter()
            .filter(|(_, entry)| entry_param_str(entry, "project").as_deref() == Some(project_id))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &victims {
            guard.memory.remove(key);
        }
        drop(guard);
        let disk_victims = disk::remove_matching(&self.cache_dir, |entry| {
            entry_param_str(entry, "project").as_deref() == Some(project_id)
        })
        .await;
        victims.len().max(disk_victims)
    }

    /// `cleanupExpired()` (spec.md §4.3). Sweeps disk for expired or
    /// corrupted entries, deleting both, and returns the delete count.
    pub async fn cleanup_expired(&self) -> usize {
        let now = SystemTime::now();
        {
            let mut guard = self.inner.lock().await;
            guard.memory.retain(|_, entry| entry.expires_at > now);
        }
        disk::cleanup_expired(&self.cache_dir, now).await
    }

    /// `getStats()` (spec.md §4.3).
    pub async fn get_stats(&self) -> CacheStats {
        let guard = self.inner.lock().await;
        let disk_size = disk::count(&self.cache_dir).await;
        CacheStats {
            hits: guard.hits,
            misses: guard.misses,
            memory_size: guard.memory.len(),
            disk_size,
        }
    }

    /// `clear()` (spec.md §4.3). Empties both tiers and resets counters.
    pub async fn clear(&self) {
        let mut guard = self.inner.lock().await;
        guard.memory.clear();
        guard.hits = 0;
        guard.misses = 0;
        drop(guard);
        disk::clear(&self.cache_dir).await;
    }
}

fn entry_param_str(entry: &CacheEntry, field: &str) -> Option<String> {
    entry
        .params
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn entry_touches_path(entry: &CacheEntry, path: &Path) -> bool {
    entry_param_str(entry, "path")
        .map(|p| {
            let entry_path = Path::new(&p);
            entry_path == path || entry_path.starts_with(path)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn round_trips_a_set_value() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        let params = json!({"path": "/a"});
        cache
            .set("fileRead", &params, json!({"text": "hi"}), None)
            .await;
        let hit = cache.get("fileRead", &params).await.unwrap();
        assert_eq!(hit.value, json!({"text": "hi"}));
        assert_eq!(hit.source, CacheSource::Memory);
    }

    #[tokio::test]
    async fn two_consecutive_gets_without_a_set_are_equal() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        let params = json!({"path": "/a"});
        cache.set("query", &params, json!(1), None).await;
        let first = cache.get("query", &params).await.unwrap();
        let second = cache.get("query", &params).await.unwrap();
        assert_eq!(first.value, second.value);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_is_deleted() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        let params = json!({"path": "/a"});
        cache
            .set("other", &params, json!(1), Some(Duration::from_millis(1)))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get("other", &params).await.is_none());
        let stats = cache.get_stats().await;
        assert_eq!(stats.memory_size, 0);
    }

    #[tokio::test]
    async fn ttl_over_60s_is_persisted_to_disk_ttl_at_60s_is_not() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        cache
            .set("query", &json!({"path": "/x"}), json!(1), Some(Duration::from_secs(60)))
            .await;
        cache
            .set("query", &json!({"path": "/y"}), json!(1), Some(Duration::from_secs(61)))
            .await;
        let disk_entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(disk_entries, 1);
    }

    #[tokio::test]
    async fn invalidate_path_removes_descendants() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        let params = json!({"path": "/proj/a.js", "detail": "summary"});
        cache.set("fileRead", &params, json!("cached"), None).await;
        let removed = cache.invalidate_path(Path::new("/proj/a.js")).await;
        assert_eq!(removed, 1);
        assert!(cache.get("fileRead", &params).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        let params = json!({"path": "/proj/a.js"});
        cache.set("fileRead", &params, json!("cached"), None).await;
        cache.invalidate_path(Path::new("/proj/a.js")).await;
        let second_pass = cache.invalidate_path(Path::new("/proj/a.js")).await;
        assert_eq!(second_pass, 0);
    }

    #[tokio::test]
    async fn clear_empties_both_tiers_and_resets_counters() {
        let dir = tempdir().unwrap();
        let cache = TtlCache::new(dir.path().to_path_buf());
        let params = json!({"path": "/a"});
        cache
            .set("query", &params, json!(1), Some(Duration::from_secs(120)))
            .await;
        cache.get("query", &params).await;
        cache.clear().await;
        let stats = cache.get_stats().await;
        assert_eq!(stats.memory_size, 0);
        assert_eq!(stats.disk_size, 0);
        assert_eq!(stats.hits, 0);
    }
}
