//! `local_ask(prompt, system?)`: direct local-model Q&A bypassing index
//! lookup. Included per the Open Question resolution in spec.md §9 — see
//! DESIGN.md.

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use serde_json::Value;

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let prompt = args::require_query(arguments, "prompt")?;
    let system = args::optional_str(arguments, "system");

    if !ctx.model_reachable().await {
        return Err(GatewayError::upstream_unavailable(
            "local model runner is not reachable",
        ));
    }

    let text = ctx
        .model
        .chat(prompt, system)
        .await
        .map_err(|error| GatewayError::upstream_unavailable(error.to_string()))?;

    let tokens_saved = crate::metrics::estimate_tokens(&text);
    Ok(ToolOutcome::new(text, Tier::T2LocalModel, false, tokens_saved))
}
