//! Per-type TTL table (spec.md §3). Grounded on the teacher's static-constant
//! style for tunables (`vtcode-core/src/cache/mod.rs::DEFAULT_CACHE_TTL`),
//! generalized from one constant to a keyed table.

use std::time::Duration;

pub const GIT_STATUS_TTL: Duration = Duration::from_secs(30);
pub const FILE_LIST_TTL: Duration = Duration::from_secs(300);
pub const NPM_LIST_TTL: Duration = Duration::from_secs(3600);
pub const FILE_READ_TTL: Duration = Duration::from_secs(600);
pub const QUERY_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Disk persistence threshold: entries with a TTL at or below this are
/// memory-only (spec.md §3, "Cache entry" + boundary behavior in §8: 60s is
/// *not* persisted, 61s is).
pub const DISK_PERSIST_THRESHOLD: Duration = Duration::from_secs(60);

/// TTL for the 60s memoized local-model reachability probe (spec.md §4.7).
pub const MODEL_REACHABILITY_TTL: Duration = Duration::from_secs(60);

/// Base TTL for a given cache entry type.
pub fn ttl_for_type(entry_type: &str) -> Duration {
    match entry_type {
        "gitStatus" => GIT_STATUS_TTL,
        "fileList" => FILE_LIST_TTL,
        "npmList" => NPM_LIST_TTL,
        "fileRead" => FILE_READ_TTL,
        "query" => QUERY_TTL,
        _ => DEFAULT_TTL,
    }
}

/// If a command string is supplied, it may override the entry type's TTL
/// (spec.md §3: "any command containing `git status` takes the `gitStatus`
/// TTL").
pub fn ttl_for_command(command: &str, entry_type: &str) -> Duration {
    if command.contains("git status") {
        GIT_STATUS_TTL
    } else if command.contains("npm list") || command.contains("npm ls") {
        NPM_LIST_TTL
    } else {
        ttl_for_type(entry_type)
    }
}

pub fn should_persist_to_disk(ttl: Duration) -> bool {
    ttl > DISK_PERSIST_THRESHOLD
}
