//! The `memory_*` family (spec.md §4.6): query, search, similar, functions,
//! health, wireframe, sessions, search_all, roadmap. Each validates a
//! project id, then invokes a corresponding helper script via the executor
//! with explicit arguments; results are forwarded verbatim.

use super::args;
use super::{ToolOutcome, ToolSpec};
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::GatewayResult;
use devgate_exec::{spawn_argv, DEFAULT_TOOL_TIMEOUT};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOp {
    Query,
    Search,
    Similar,
    Functions,
    Health,
    Wireframe,
    Sessions,
    SearchAll,
    Roadmap,
}

impl MemoryOp {
    fn tool_name(self) -> &'static str {
        match self {
            MemoryOp::Query => "memory_query",
            MemoryOp::Search => "memory_search",
            MemoryOp::Similar => "memory_similar",
            MemoryOp::Functions => "memory_functions",
            MemoryOp::Health => "memory_health",
            MemoryOp::Wireframe => "memory_wireframe",
            MemoryOp::Sessions => "memory_sessions",
            MemoryOp::SearchAll => "memory_search_all",
            MemoryOp::Roadmap => "memory_roadmap",
        }
    }

    fn description(self) -> &'static str {
        match self {
            MemoryOp::Query => "Query a project's memory for a natural-language answer.",
            MemoryOp::Search => "Search a project's memory for matching entries.",
            MemoryOp::Similar => "Find memory entries similar to a given query.",
            MemoryOp::Functions => "List indexed functions for a project.",
            MemoryOp::Health => "Report the health of a project's memory index.",
            MemoryOp::Wireframe => "Return the project's structural wireframe.",
            MemoryOp::Sessions => "List recorded work sessions for a project.",
            MemoryOp::SearchAll => "Search memory across every registered project.",
            MemoryOp::Roadmap => "Return the project's roadmap.",
        }
    }

    /// Whether this op additionally requires a `query` argument.
    fn requires_query(self) -> bool {
        matches!(self, MemoryOp::Query | MemoryOp::Search | MemoryOp::Similar)
    }
}

pub fn tool_spec(op: MemoryOp) -> ToolSpec {
    let mut properties = serde_json::Map::new();
    properties.insert("project".to_string(), serde_json::json!({"type": "string"}));
    let mut required = vec!["project"];
    if op.requires_query() {
        properties.insert("query".to_string(), serde_json::json!({"type": "string"}));
        required.push("query");
    }
    if matches!(op, MemoryOp::Search | MemoryOp::Similar | MemoryOp::SearchAll) {
        properties.insert("limit".to_string(), serde_json::json!({"type": "integer"}));
    }

    ToolSpec {
        name: op.tool_name(),
        description: op.description(),
        input_schema: Value::Object(
            [
                ("type".to_string(), serde_json::json!("object")),
                ("properties".to_string(), Value::Object(properties)),
                ("required".to_string(), serde_json::json!(required)),
            ]
            .into_iter()
            .collect(),
        ),
    }
}

pub async fn handle(ctx: &GatewayContext, arguments: &Value, op: MemoryOp) -> GatewayResult<ToolOutcome> {
    let project_id = if op == MemoryOp::SearchAll {
        None
    } else {
        Some(args::require_project_id(arguments, "project")?)
    };

    let mut helper_args = Vec::new();
    if let Some(project_id) = project_id {
        helper_args.push("--project".to_string());
        helper_args.push(project_id.to_string());
    }
    if op.requires_query() {
        let query = args::require_query(arguments, "query")?;
        helper_args.push("--query".to_string());
        helper_args.push(query.to_string());
    }
    if let Some(limit) = args::clamp_optional_limit(arguments, "limit") {
        helper_args.push("--limit".to_string());
        helper_args.push(limit.to_string());
    }

    let helper = ctx.settings.helper_path(op.tool_name());
    let cwd = ctx.client_cwd().await.unwrap_or_else(|| ctx.settings.memory_root.clone());
    let outcome = spawn_argv(&helper, &helper_args, &cwd, DEFAULT_TOOL_TIMEOUT)
        .await
        .map_err(|error| crate::error::GatewayError::subprocess_failed(error.to_string()))?;
    let text = outcome
        .into_result()
        .map_err(crate::error::GatewayError::subprocess_failed)?;

    Ok(ToolOutcome::new(text, Tier::T1MemoryIndex, false, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_op_has_a_distinct_helper_name() {
        let ops = [
            MemoryOp::Query,
            MemoryOp::Search,
            MemoryOp::Similar,
            MemoryOp::Functions,
            MemoryOp::Health,
            MemoryOp::Wireframe,
            MemoryOp::Sessions,
            MemoryOp::SearchAll,
            MemoryOp::Roadmap,
        ];
        let mut names: Vec<&str> = ops.iter().map(|op| op.tool_name()).collect();
        let unique_count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), unique_count);
    }

    #[test]
    fn query_ops_require_a_query_argument_in_their_schema() {
        let spec = tool_spec(MemoryOp::Search);
        let required = spec.input_schema.get("required").unwrap().as_array().unwrap();
        assert!(required.iter().any(|v| v == "query"));
    }

    #[tokio::test]
    async fn missing_project_id_is_invalid_input() {
        use crate::config::GatewaySettings;
        let dir = tempfile::tempdir().unwrap();
        let ctx = GatewayContext::new(GatewaySettings {
            memory_root: dir.path().join(".memory"),
            ..GatewaySettings::default()
        })
        .await;
        let request_args = serde_json::json!({});
        let error = handle(&ctx, &request_args, MemoryOp::Health).await.unwrap_err();
        assert_eq!(error.category, devgate_commons::ErrorCategory::InvalidInput);
    }
}
