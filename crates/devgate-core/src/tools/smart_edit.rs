//! `smart_edit(path, content, project?)` (spec.md §4.6): the single
//! validated write primitive. Never cached, never served from cache.

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use crate::security::{validate_file_path, PathOp};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let raw_path = args::require_str(arguments, "path")?;
    let content = args::require_str(arguments, "content")?;

    let registry = ctx.load_registry().await;
    let allowed_bases = ctx.allowed_bases(&registry);
    let resolved = validate_file_path(raw_path, PathOp::Write, &allowed_bases)?;

    write_atomically(&resolved, content)
        .await
        .map_err(|error| GatewayError::subprocess_failed(format!("failed to write `{}`: {error}", resolved.display())))?;

    let invalidated = ctx.cache.invalidate_path(&resolved).await;
    tracing::debug!(path = %resolved.display(), invalidated, "smart_edit: invalidated cache entries");

    if let Some(project) = resolve_project(arguments, &registry, &resolved) {
        let sentinel_error = touch_reindex_sentinel(ctx, &project.id).await.err();
        if let Some(error) = sentinel_error {
            // Invalidation/sentinel failures are non-fatal and never undo the write (spec.md §7).
            tracing::warn!(%error, project = %project.id, "failed to touch reindex sentinel (non-fatal)");
        }
    }

    let text = format!("File: {} written ({} bytes)", resolved.display(), content.len());
    Ok(ToolOutcome::new(text, Tier::T3Filesystem, false, 0))
}

async fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, content.as_bytes()).await?;
    tokio::fs::rename(&tmp_path, path).await
}

fn resolve_project(
    arguments: &Value,
    registry: &crate::config::ProjectRegistry,
    resolved: &Path,
) -> Option<crate::config::Project> {
    if let Some(id) = args::optional_str(arguments, "project") {
        return registry.find(id).cloned();
    }
    registry.detect_from_cwd(resolved).cloned()
}

async fn touch_reindex_sentinel(ctx: &GatewayContext, project_id: &str) -> std::io::Result<()> {
    let path: PathBuf = ctx.settings.project_dir(project_id).join(".reindex-trigger");
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, []).await
}
