//! `smart_read(path, detail ∈ {summary,functions,full}, project?)` (spec.md §4.6).

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::config::{Project, ProjectRegistry};
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use crate::security::{validate_file_path, PathOp};
use crate::ttl;
use serde_json::{json, Value};
use std::path::Path;

const DETAIL_KINDS: &[&str] = &["summary", "functions", "full"];

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let raw_path = args::require_str(arguments, "path")?;
    let detail = args::optional_str(arguments, "detail").unwrap_or("summary");
    if !DETAIL_KINDS.contains(&detail) {
        return Err(GatewayError::invalid_input(format!(
            "`detail` must be one of {DETAIL_KINDS:?}"
        )));
    }

    let registry = ctx.load_registry().await;
    let allowed_bases = ctx.allowed_bases(&registry);
    let resolved = validate_file_path(raw_path, PathOp::Read, &allowed_bases)?;

    let project = resolve_project(ctx, arguments, &registry, &resolved).await;

    let params = json!({"path": resolved.to_string_lossy(), "detail": detail});
    if let Some(hit) = ctx.cache.get("fileRead", &params).await {
        let text = hit
            .value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let tokens_saved = hit.value.get("tokensSaved").and_then(Value::as_u64).unwrap_or(0);
        return Ok(ToolOutcome::new(text, Tier::T0Cache, true, tokens_saved));
    }

    let (body, tier, tokens_saved) = synthesize(ctx, project.as_ref(), &resolved, detail).await?;
    let text = format!("File: {}\n\n{body}", resolved.display());
    ctx.cache
        .set(
            "fileRead",
            &params,
            json!({"text": text, "tokensSaved": tokens_saved}),
            Some(ttl::FILE_READ_TTL),
        )
        .await;

    Ok(ToolOutcome::new(text, tier, false, tokens_saved))
}

async fn resolve_project(
    ctx: &GatewayContext,
    arguments: &Value,
    registry: &ProjectRegistry,
    resolved_path: &Path,
) -> Option<Project> {
    if let Some(id) = args::optional_str(arguments, "project") {
        return registry.find(id).cloned();
    }
    if let Some(cwd) = ctx.client_cwd().await {
        if let Some(project) = registry.detect_from_cwd(&cwd) {
            return Some(project.clone());
        }
    }
    registry.detect_from_cwd(resolved_path).cloned()
}

/// Returns `(body, serving tier, tokens saved)`.
async fn synthesize(
    ctx: &GatewayContext,
    project: Option<&Project>,
    resolved: &Path,
    detail: &str,
) -> GatewayResult<(String, Tier, u64)> {
    if detail != "full" {
        if let Some(project) = project {
            if let Some((body, tokens_saved)) = read_from_index(ctx, project, resolved, detail).await {
                return Ok((body, Tier::T1MemoryIndex, tokens_saved));
            }
        }
    }

    let bytes = tokio::fs::read(resolved).await.map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            GatewayError::not_found(format!("file `{}` does not exist", resolved.display()))
        } else {
            GatewayError::not_found(format!("failed to read `{}`: {error}", resolved.display()))
        }
    })?;
    let body = String::from_utf8_lossy(&bytes).into_owned();
    Ok((body, Tier::T3Filesystem, 0))
}

/// Try to synthesize a result from the project's index files, returning
/// `None` (not an error) if the index doesn't cover this path — the caller
/// falls back to reading the raw file (spec.md §4.6: "else fall back to
/// reading the file bytes").
async fn read_from_index(
    ctx: &GatewayContext,
    project: &Project,
    resolved: &Path,
    detail: &str,
) -> Option<(String, u64)> {
    let memory_dir = project
        .memory_path
        .clone()
        .unwrap_or_else(|| ctx.settings.project_dir(&project.id));
    let index_file = match detail {
        "functions" => memory_dir.join("functions.json"),
        _ => memory_dir.join("summaries.json"),
    };

    let bytes = tokio::fs::read(&index_file).await.ok()?;
    let index: Value = serde_json::from_slice(&bytes).ok()?;
    let key = resolved.to_string_lossy();
    let entry = index.get(key.as_ref())?;

    let body = match detail {
        "functions" => entry
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => entry.as_str()?.to_string(),
    };

    let full_size = tokio::fs::metadata(resolved).await.map(|m| m.len()).unwrap_or(0);
    let tokens_saved = full_size.saturating_sub(body.len() as u64);
    Some((body, tokens_saved))
}
