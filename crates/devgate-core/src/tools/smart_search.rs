//! `smart_search(query, project?, limit?)` (spec.md §4.6): delegates to the
//! hybrid-search helper (external collaborator, §6.3) via the executor.

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use crate::ttl;
use devgate_exec::{spawn_argv, DEFAULT_TOOL_TIMEOUT};
use serde_json::{json, Value};

const HYBRID_SEARCH_HELPER: &str = "hybrid_search";

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let query = args::require_query(arguments, "query")?;
    let project = args::optional_str(arguments, "project");
    let limit = args::clamp_optional_limit(arguments, "limit").unwrap_or(10);

    let params = json!({"project": project, "query": query});
    if let Some(hit) = ctx.cache.get("query", &params).await {
        let text = hit.value.as_str().unwrap_or_default().to_string();
        let tokens_saved = crate::metrics::estimate_tokens(&text);
        return Ok(ToolOutcome::new(text, Tier::T0Cache, true, tokens_saved));
    }

    let helper = ctx.settings.helper_path(HYBRID_SEARCH_HELPER);
    let mut helper_args = vec!["--query".to_string(), query.to_string(), "--limit".to_string(), limit.to_string()];
    if let Some(project) = project {
        helper_args.push("--project".to_string());
        helper_args.push(project.to_string());
    }

    let cwd = ctx.client_cwd().await.unwrap_or_else(|| ctx.settings.memory_root.clone());
    let outcome = spawn_argv(&helper, &helper_args, &cwd, DEFAULT_TOOL_TIMEOUT)
        .await
        .map_err(|error| GatewayError::subprocess_failed(error.to_string()))?;
    let text = outcome
        .into_result()
        .map_err(GatewayError::subprocess_failed)?;

    ctx.cache.set("query", &params, json!(text), Some(ttl::QUERY_TTL)).await;

    // The full response stands in for the token cost of the alternative
    // (a broad grep plus reading every candidate file), per spec.md §4.6.
    let tokens_saved = crate::metrics::estimate_tokens(&text);
    Ok(ToolOutcome::new(text, Tier::T1MemoryIndex, false, tokens_saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewaySettings;
    use tempfile::tempdir;

    #[tokio::test]
    async fn cache_hit_never_reaches_the_helper_executable() {
        let dir = tempdir().unwrap();
        let ctx = GatewayContext::new(GatewaySettings {
            memory_root: dir.path().join(".memory"),
            helpers_dir: dir.path().join("does-not-exist"),
            ..GatewaySettings::default()
        })
        .await;

        let params = json!({"project": Value::Null, "query": "where is login handled?"});
        ctx.cache
            .set("query", &params, json!("cached search result"), Some(ttl::QUERY_TTL))
            .await;

        let request_args = json!({"query": "where is login handled?"});
        let outcome = handle(&ctx, &request_args).await.unwrap();
        assert!(outcome.cache_hit);
        assert_eq!(outcome.text, "cached search result");
    }
}
