//! Metrics Recorder (spec.md §4.5, component C5).
//!
//! Grounded on `vtcode-core/src/metrics/execution_metrics.rs`'s
//! ring-buffer-plus-aggregate-counters shape (`VecDeque<ExecutionRecord>`,
//! `total_*` counters), extended with per-route totals, per-day buckets, and
//! cumulative dollar savings as spec.md §3/§4.5 require.

use crate::classifier::Tier;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use tokio::sync::Mutex;

const RING_BUFFER_CAPACITY: usize = 100;
const PERSIST_EVERY_N_RECORDS: u64 = 10;

/// Fixed dollar-per-million-tokens constant used to estimate savings for
/// tier-T2 (local-model) routes, per spec.md §4.5.
pub const DOLLARS_PER_MILLION_TOKENS: f64 = 3.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub tool: String,
    pub route: String,
    pub tokens_used: u64,
    pub tokens_saved: u64,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DayBucket {
    pub queries: u64,
    pub tokens_saved: u64,
    pub cache_hits: u64,
    pub local_model_queries: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub total_tokens_saved: u64,
    pub per_route_totals: HashMap<String, u64>,
    pub per_day: HashMap<String, DayBucket>,
    pub recent: VecDeque<MetricsRecord>,
    pub estimated_dollar_savings: f64,
}

/// Process-lifetime metrics state, periodically persisted and reloaded on
/// restart (spec.md §3 "Metrics record").
pub struct MetricsRecorder {
    persist_path: PathBuf,
    state: Mutex<MetricsState>,
}

struct MetricsState {
    snapshot: MetricsSnapshot,
    records_since_persist: u64,
}

impl MetricsRecorder {
    pub fn new(persist_path: PathBuf) -> Self {
        Self {
            persist_path,
            state: Mutex::new(MetricsState {
                snapshot: MetricsSnapshot::default(),
                records_since_persist: 0,
            }),
        }
    }

    /// Reload a prior snapshot from disk on process startup. Missing or
    /// corrupted files are non-fatal: metrics simply restart from zero.
    pub async fn load(persist_path: PathBuf) -> Self {
        let snapshot = match tokio::fs::read(&persist_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => MetricsSnapshot::default(),
        };
        Self {
            persist_path,
            state: Mutex::new(MetricsState {
                snapshot,
                records_since_persist: 0,
            }),
        }
    }

    /// Record a completed request. Every `PERSIST_EVERY_N_RECORDS` records,
    /// persist atomically (write-to-tmp then rename); persistence failures
    /// are non-fatal (spec.md §7).
    pub async fn record(&self, record: MetricsRecord, tier: Option<Tier>) {
        let mut guard = self.state.lock().await;
        let snapshot = &mut guard.snapshot;

        snapshot.total_queries += 1;
        snapshot.total_tokens_saved += record.tokens_saved;
        *snapshot.per_route_totals.entry(record.route.clone()).or_insert(0) += 1;

        if matches!(tier, Some(Tier::T2LocalModel)) {
            snapshot.estimated_dollar_savings +=
                record.tokens_used as f64 / 1_000_000.0 * DOLLARS_PER_MILLION_TOKENS;
        }

        let day_key = record.timestamp.date_naive();
        let bucket = snapshot.per_day.entry(day_key_to_string(day_key)).or_default();
        bucket.queries += 1;
        bucket.tokens_saved += record.tokens_saved;
        if record.cache_hit {
            bucket.cache_hits += 1;
        }
        if matches!(tier, Some(Tier::T2LocalModel)) {
            bucket.local_model_queries += 1;
        }

        if snapshot.recent.len() >= RING_BUFFER_CAPACITY {
            snapshot.recent.pop_front();
        }
        snapshot.recent.push_back(record);

        guard.records_since_persist += 1;
        let should_persist = guard.records_since_persist >= PERSIST_EVERY_N_RECORDS;
        if should_persist {
            guard.records_since_persist = 0;
        }
        let snapshot_to_persist = should_persist.then(|| guard.snapshot.clone());
        drop(guard);

        if let Some(snapshot) = snapshot_to_persist {
            self.persist(&snapshot).await;
        }
    }

    /// Force an immediate persist, used on graceful shutdown (EOF/SIGINT).
    pub async fn flush(&self) {
        let snapshot = self.state.lock().await.snapshot.clone();
        self.persist(&snapshot).await;
    }

    async fn persist(&self, snapshot: &MetricsSnapshot) {
        if let Some(parent) = self.persist_path.parent() {
            if let Err(error) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(%error, "failed to create metrics directory (non-fatal)");
                return;
            }
        }
        let tmp_path = self.persist_path.with_extension("json.tmp");
        let bytes = match serde_json::to_vec_pretty(snapshot) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(%error, "failed to serialize metrics (non-fatal)");
                return;
            }
        };
        if let Err(error) = tokio::fs::write(&tmp_path, bytes).await {
            tracing::warn!(%error, "failed to write metrics tmp file (non-fatal)");
            return;
        }
        if let Err(error) = tokio::fs::rename(&tmp_path, &self.persist_path).await {
            tracing::warn!(%error, "failed to rename metrics tmp file (non-fatal)");
        }
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.state.lock().await.snapshot.clone()
    }
}

fn day_key_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Estimate tokens from response length: `len / 4 ~= tokens` (spec.md §4.5,
/// §9 "Open questions": advisory, not billable).
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64 / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_record(route: &str, tokens_saved: u64, cache_hit: bool) -> MetricsRecord {
        MetricsRecord {
            tool: "smart_read".into(),
            route: route.into(),
            tokens_used: 100,
            tokens_saved,
            latency_ms: 5,
            cache_hit,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn tokens_saved_counter_is_monotonically_non_decreasing() {
        let dir = tempdir().unwrap();
        let recorder = MetricsRecorder::new(dir.path().join("metrics.json"));
        let mut previous = 0;
        for _ in 0..5 {
            recorder.record(sample_record("cached", 10, true), None).await;
            let snapshot = recorder.snapshot().await;
            assert!(snapshot.total_tokens_saved >= previous);
            previous = snapshot.total_tokens_saved;
        }
    }

    #[tokio::test]
    async fn ring_buffer_caps_at_100_records() {
        let dir = tempdir().unwrap();
        let recorder = MetricsRecorder::new(dir.path().join("metrics.json"));
        for _ in 0..150 {
            recorder.record(sample_record("cached", 1, true), None).await;
        }
        let snapshot = recorder.snapshot().await;
        assert_eq!(snapshot.recent.len(), 100);
    }

    #[tokio::test]
    async fn persists_every_ten_records_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let recorder = MetricsRecorder::new(path.clone());
        for _ in 0..10 {
            recorder.record(sample_record("local_model", 5, false), None).await;
        }
        assert!(tokio::fs::metadata(&path).await.is_ok());

        let reloaded = MetricsRecorder::load(path).await;
        let snapshot = reloaded.snapshot().await;
        assert_eq!(snapshot.total_queries, 10);
    }

    #[tokio::test]
    async fn local_model_route_accrues_dollar_savings() {
        let dir = tempdir().unwrap();
        let recorder = MetricsRecorder::new(dir.path().join("metrics.json"));
        recorder
            .record(sample_record("local_model", 0, false), Some(Tier::T2LocalModel))
            .await;
        let snapshot = recorder.snapshot().await;
        assert!(snapshot.estimated_dollar_savings > 0.0);
    }

    #[test]
    fn estimate_tokens_uses_four_chars_per_token_heuristic() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }
}
