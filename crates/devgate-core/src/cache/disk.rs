//! Disk tier: one JSON file per cache entry at `CACHE_DIR/<md5-key>.json`
//! (spec.md §3, §6.2). Writes are rename-atomic (write-to-tmp then rename),
//! matching the teacher's convention for every other persisted file
//! (metrics, cache) — see the design note at spec.md §5 "Shared-resource
//! policy".

use super::entry::CacheEntry;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

fn entry_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("{key}.json"))
}

pub async fn write(cache_dir: &Path, entry: &CacheEntry) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(cache_dir).await?;
    let final_path = entry_path(cache_dir, &entry.key);
    let tmp_path = cache_dir.join(format!("{}.tmp", entry.key));
    let bytes = serde_json::to_vec(entry)?;
    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, &final_path).await?;
    Ok(())
}

/// Read an entry from disk. A corrupted file is deleted rather than
/// returned, per spec.md §4.3's invariant.
pub async fn read(cache_dir: &Path, key: &str) -> Option<CacheEntry> {
    let path = entry_path(cache_dir, key);
    let bytes = tokio::fs::read(&path).await.ok()?;
    match serde_json::from_slice::<CacheEntry>(&bytes) {
        Ok(entry) => Some(entry),
        Err(error) => {
            tracing::warn!(%error, key, "corrupted cache entry on disk; removing");
            let _ = tokio::fs::remove_file(&path).await;
            None
        }
    }
}

pub async fn remove(cache_dir: &Path, key: &str) -> anyhow::Result<()> {
    match tokio::fs::remove_file(entry_path(cache_dir, key)).await {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error.into()),
    }
}

async fn list_entries(cache_dir: &Path) -> Vec<(PathBuf, String)> {
    let mut results = Vec::new();
    let mut read_dir = match tokio::fs::read_dir(cache_dir).await {
        Ok(rd) => rd,
        Err(_) => return results,
    };
    while let Ok(Some(dir_entry)) = read_dir.next_entry().await {
        let path = dir_entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
                results.push((path.clone(), key.to_string()));
            }
        }
    }
    results
}

pub async fn remove_matching(cache_dir: &Path, predicate: impl Fn(&CacheEntry) -> bool) -> usize {
    let mut removed = 0;
    for (path, key) in list_entries(cache_dir).await {
        if let Some(entry) = read(cache_dir, &key).await {
            if predicate(&entry) {
                let _ = tokio::fs::remove_file(&path).await;
                removed += 1;
            }
        }
    }
    removed
}

pub async fn cleanup_expired(cache_dir: &Path, now: SystemTime) -> usize {
    let mut removed = 0;
    for (path, key) in list_entries(cache_dir).await {
        match read(cache_dir, &key).await {
            Some(entry) if entry.expires_at <= now => {
                let _ = tokio::fs::remove_file(&path).await;
                removed += 1;
            }
            None => removed += 1, // corrupted entries already removed by `read`
            _ => {}
        }
    }
    removed
}

pub async fn count(cache_dir: &Path) -> usize {
    list_entries(cache_dir).await.len()
}

pub async fn clear(cache_dir: &Path) {
    for (path, _) in list_entries(cache_dir).await {
        let _ = tokio::fs::remove_file(&path).await;
    }
}
