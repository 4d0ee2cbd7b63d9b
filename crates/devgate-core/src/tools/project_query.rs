//! `project_query(project, query, type)` (spec.md §4.6): the cross-project
//! variant of the `memory_*` family, for asking about a project other than
//! the one the client is currently working in.

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use devgate_exec::{spawn_argv, DEFAULT_TOOL_TIMEOUT};
use serde_json::Value;

const QUERY_KINDS: &[&str] = &["memory", "functions", "similar", "decisions", "patterns"];

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let target_id = args::require_project_id(arguments, "project")?;
    let query = args::require_query(arguments, "query")?;
    let query_type = args::optional_str(arguments, "type").unwrap_or("memory");
    if !QUERY_KINDS.contains(&query_type) {
        return Err(GatewayError::invalid_input(format!(
            "`type` must be one of {QUERY_KINDS:?}"
        )));
    }

    let registry = ctx.load_registry().await;
    registry
        .find(target_id)
        .ok_or_else(|| GatewayError::not_found(format!("unknown project `{target_id}`")))?;

    let source_id = match ctx.client_cwd().await {
        Some(cwd) => registry.detect_from_cwd(&cwd).map(|p| p.id.clone()),
        None => None,
    };

    let helper = ctx.settings.helper_path("project_query");
    let helper_args = vec![
        "--project".to_string(),
        target_id.to_string(),
        "--query".to_string(),
        query.to_string(),
        "--type".to_string(),
        query_type.to_string(),
    ];
    let cwd = ctx.client_cwd().await.unwrap_or_else(|| ctx.settings.memory_root.clone());
    let outcome = spawn_argv(&helper, &helper_args, &cwd, DEFAULT_TOOL_TIMEOUT)
        .await
        .map_err(|error| GatewayError::subprocess_failed(error.to_string()))?;
    let body = outcome.into_result().map_err(GatewayError::subprocess_failed)?;

    let text = match &source_id {
        Some(source) if source != target_id => format!("{source} → {target_id}\n\n{body}"),
        _ => body,
    };

    Ok(ToolOutcome::new(text, Tier::T1MemoryIndex, false, 0))
}
