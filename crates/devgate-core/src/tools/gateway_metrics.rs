//! `gateway_metrics(format ∈ {summary,detailed,recent})` (spec.md §4.6):
//! read-only, drawn from the Metrics Recorder and Cache stats.

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use serde_json::Value;
use std::fmt::Write as _;

const FORMATS: &[&str] = &["summary", "detailed", "recent"];

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let format = args::optional_str(arguments, "format").unwrap_or("summary");
    if !FORMATS.contains(&format) {
        return Err(GatewayError::invalid_input(format!("`format` must be one of {FORMATS:?}")));
    }

    let snapshot = ctx.metrics.snapshot().await;
    let cache_stats = ctx.cache.get_stats().await;

    let mut text = String::new();
    let _ = writeln!(text, "Total queries: {}", snapshot.total_queries);
    let _ = writeln!(text, "Tokens saved: {}", snapshot.total_tokens_saved);
    let _ = writeln!(text, "Estimated $ saved: {:.4}", snapshot.estimated_dollar_savings);
    let _ = writeln!(
        text,
        "Cache: {} hits / {} misses ({:.1}% hit rate), {} in memory, {} on disk",
        cache_stats.hits,
        cache_stats.misses,
        cache_stats.hit_rate() * 100.0,
        cache_stats.memory_size,
        cache_stats.disk_size
    );

    if format == "detailed" {
        let mut routes: Vec<(&String, &u64)> = snapshot.per_route_totals.iter().collect();
        routes.sort_by(|a, b| b.1.cmp(a.1));
        let _ = writeln!(text, "\nPer-route totals:");
        for (route, count) in routes {
            let _ = writeln!(text, "  {route}: {count}");
        }

        let mut days: Vec<(&String, &crate::metrics::DayBucket)> = snapshot.per_day.iter().collect();
        days.sort_by(|a, b| a.0.cmp(b.0));
        let _ = writeln!(text, "\nPer-day buckets:");
        for (day, bucket) in days {
            let _ = writeln!(
                text,
                "  {day}: {} queries, {} tokens saved, {} cache hits, {} local-model queries",
                bucket.queries, bucket.tokens_saved, bucket.cache_hits, bucket.local_model_queries
            );
        }
    }

    if format == "recent" {
        let _ = writeln!(text, "\nRecent requests (most recent last):");
        for record in &snapshot.recent {
            let _ = writeln!(
                text,
                "  [{}] {} via {} — {}ms, {} tokens saved",
                record.timestamp.to_rfc3339(),
                record.tool,
                record.route,
                record.latency_ms,
                record.tokens_saved
            );
        }
    }

    Ok(ToolOutcome::new(text, Tier::T3Filesystem, false, 0))
}
