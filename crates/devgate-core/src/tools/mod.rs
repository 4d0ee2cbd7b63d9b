//! Tool Handlers (spec.md §4.6, component C6): the per-tool business logic
//! that consults the security validator, the cache, the classifier, and the
//! external collaborators to produce a result.
//!
//! Grounded on `mcp/tool_discovery.rs`'s registration/dispatch shape and
//! `tool_policy.rs`'s per-tool argument checking before dispatch. Every
//! handler returns a [`ToolOutcome`]; [`dispatch`] is the single place that
//! times the call and records it to the Metrics Recorder, so no handler has
//! to remember to do so itself.

mod args;
mod gateway_metrics;
mod local_ask;
mod memory;
mod project_query;
mod smart_edit;
mod smart_exec;
mod smart_read;
mod smart_search;

use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use crate::metrics::MetricsRecord;
use chrono::Utc;
use serde_json::Value;
use std::time::Instant;

/// The outcome of a single tool invocation, before it is wrapped into the
/// RPC response envelope.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub text: String,
    pub tier: Tier,
    pub cache_hit: bool,
    pub tokens_used: u64,
    pub tokens_saved: u64,
}

impl ToolOutcome {
    pub fn new(text: impl Into<String>, tier: Tier, cache_hit: bool, tokens_saved: u64) -> Self {
        let text = text.into();
        let tokens_used = crate::metrics::estimate_tokens(&text);
        Self {
            text,
            tier,
            cache_hit,
            tokens_used,
            tokens_saved,
        }
    }
}

fn route_label(tier: Tier, cache_hit: bool) -> &'static str {
    if cache_hit {
        return "cached";
    }
    match tier {
        Tier::T0Cache => "cached",
        Tier::T1MemoryIndex => "memory_index",
        Tier::T2LocalModel => "local_model",
        Tier::T3Filesystem => "filesystem",
        Tier::T4RemoteApi => "remote_api",
    }
}

/// Dispatch a `tools/call` request by name (spec.md §4.8), then record the
/// completed request to the Metrics Recorder regardless of outcome.
pub async fn dispatch(ctx: &GatewayContext, name: &str, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let started_at = Instant::now();
    let result = dispatch_inner(ctx, name, arguments).await;
    let latency_ms = started_at.elapsed().as_millis() as u64;

    if let Ok(outcome) = &result {
        ctx.metrics
            .record(
                MetricsRecord {
                    tool: name.to_string(),
                    route: route_label(outcome.tier, outcome.cache_hit).to_string(),
                    tokens_used: outcome.tokens_used,
                    tokens_saved: outcome.tokens_saved,
                    latency_ms,
                    cache_hit: outcome.cache_hit,
                    timestamp: Utc::now(),
                },
                Some(outcome.tier),
            )
            .await;
    }

    result
}

async fn dispatch_inner(ctx: &GatewayContext, name: &str, arguments: &Value) -> GatewayResult<ToolOutcome> {
    match name {
        "smart_read" => smart_read::handle(ctx, arguments).await,
        "smart_search" => smart_search::handle(ctx, arguments).await,
        "smart_exec" => smart_exec::handle(ctx, arguments).await,
        "smart_edit" => smart_edit::handle(ctx, arguments).await,
        "memory_query" => memory::handle(ctx, arguments, memory::MemoryOp::Query).await,
        "memory_search" => memory::handle(ctx, arguments, memory::MemoryOp::Search).await,
        "memory_similar" => memory::handle(ctx, arguments, memory::MemoryOp::Similar).await,
        "memory_functions" => memory::handle(ctx, arguments, memory::MemoryOp::Functions).await,
        "memory_health" => memory::handle(ctx, arguments, memory::MemoryOp::Health).await,
        "memory_wireframe" => memory::handle(ctx, arguments, memory::MemoryOp::Wireframe).await,
        "memory_sessions" => memory::handle(ctx, arguments, memory::MemoryOp::Sessions).await,
        "memory_search_all" => memory::handle(ctx, arguments, memory::MemoryOp::SearchAll).await,
        "memory_roadmap" => memory::handle(ctx, arguments, memory::MemoryOp::Roadmap).await,
        "project_query" => project_query::handle(ctx, arguments).await,
        "gateway_metrics" => gateway_metrics::handle(ctx, arguments).await,
        "local_ask" => local_ask::handle(ctx, arguments).await,
        other => Err(GatewayError::invalid_input(format!("unknown tool `{other}`"))),
    }
}

/// The static tool catalog returned from `tools/list` (spec.md §4.8). Kept
/// here rather than in `devgate-bin` so the catalog and the dispatch table
/// above cannot drift apart.
pub fn catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            "smart_read",
            "Read a file, served from the cheapest available tier (cache, project index, or raw filesystem).",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "detail": {"type": "string", "enum": ["summary", "functions", "full"]},
                    "project": {"type": "string"}
                },
                "required": ["path"]
            }),
        ),
        ToolSpec::new(
            "smart_search",
            "Hybrid search across a project's code-memory index.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "project": {"type": "string"},
                    "limit": {"type": "integer"}
                },
                "required": ["query"]
            }),
        ),
        ToolSpec::new(
            "smart_exec",
            "Execute a shell command (the sole unrestricted shell escape hatch).",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string"},
                    "cwd": {"type": "string"},
                    "skipCache": {"type": "boolean"}
                },
                "required": ["command"]
            }),
        ),
        ToolSpec::new(
            "smart_edit",
            "Write a file atomically and invalidate cache entries and the project index sentinel.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"},
                    "project": {"type": "string"}
                },
                "required": ["path", "content"]
            }),
        ),
        memory::tool_spec(memory::MemoryOp::Query),
        memory::tool_spec(memory::MemoryOp::Search),
        memory::tool_spec(memory::MemoryOp::Similar),
        memory::tool_spec(memory::MemoryOp::Functions),
        memory::tool_spec(memory::MemoryOp::Health),
        memory::tool_spec(memory::MemoryOp::Wireframe),
        memory::tool_spec(memory::MemoryOp::Sessions),
        memory::tool_spec(memory::MemoryOp::SearchAll),
        memory::tool_spec(memory::MemoryOp::Roadmap),
        ToolSpec::new(
            "project_query",
            "Query another project's memory from the context of the current one.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project": {"type": "string"},
                    "query": {"type": "string"},
                    "type": {"type": "string", "enum": ["memory", "functions", "similar", "decisions", "patterns"]}
                },
                "required": ["project", "query", "type"]
            }),
        ),
        ToolSpec::new(
            "gateway_metrics",
            "Read-only summary of routing statistics and cache performance.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "format": {"type": "string", "enum": ["summary", "detailed", "recent"]}
                }
            }),
        ),
        ToolSpec::new(
            "local_ask",
            "Ask the local model directly, bypassing index lookup.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "prompt": {"type": "string"},
                    "system": {"type": "string"}
                },
                "required": ["prompt"]
            }),
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolSpec {
    fn new(name: &'static str, description: &'static str, input_schema: Value) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_no_duplicate_tool_names() {
        let names: Vec<&str> = catalog().iter().map(|t| t.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names.len(), sorted.len());
    }

    #[test]
    fn catalog_includes_every_spec_tool() {
        let names: Vec<&str> = catalog().iter().map(|t| t.name).collect();
        for expected in [
            "smart_read",
            "smart_search",
            "smart_exec",
            "smart_edit",
            "memory_query",
            "memory_roadmap",
            "project_query",
            "gateway_metrics",
            "local_ask",
        ] {
            assert!(names.contains(&expected), "missing tool `{expected}`");
        }
    }
}
