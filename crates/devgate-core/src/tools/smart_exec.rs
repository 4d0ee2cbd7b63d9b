//! `smart_exec(command, cwd?, skipCache?)` (spec.md §4.6): the sole
//! unrestricted shell escape hatch, gated by the command validator.

use super::args;
use super::ToolOutcome;
use crate::classifier::Tier;
use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use crate::security::validate_command;
use crate::ttl;
use devgate_exec::{spawn_shell, DEFAULT_TOOL_TIMEOUT};
use serde_json::{json, Value};
use std::path::PathBuf;

pub async fn handle(ctx: &GatewayContext, arguments: &Value) -> GatewayResult<ToolOutcome> {
    let command = args::require_str(arguments, "command")?;
    let cwd = args::optional_str(arguments, "cwd").map(PathBuf::from);
    let skip_cache = args::optional_bool(arguments, "skipCache");

    let check = validate_command(command);
    if !check.valid {
        return Err(GatewayError::command_blocked(
            check.reason.unwrap_or_else(|| "command blocked".to_string()),
        ));
    }
    for warning in &check.warnings {
        tracing::warn!(command, warning, "smart_exec: command matched a warning pattern");
    }

    let params = json!({"command": command, "cwd": cwd.as_ref().map(|p| p.to_string_lossy())});
    if !skip_cache {
        if let Some(hit) = ctx.cache.get("command", &params).await {
            let text = hit.value.as_str().unwrap_or_default().to_string();
            return Ok(ToolOutcome::new(text, Tier::T0Cache, true, 0));
        }
    }

    let effective_cwd = match cwd {
        Some(cwd) => cwd,
        None => ctx
            .client_cwd()
            .await
            .unwrap_or_else(|| ctx.settings.memory_root.clone()),
    };

    let outcome = spawn_shell(command, &effective_cwd, DEFAULT_TOOL_TIMEOUT)
        .await
        .map_err(|error| match error {
            devgate_exec::ExecError::Timeout { .. } => GatewayError::timeout(error.to_string()),
            other => GatewayError::subprocess_failed(other.to_string()),
        })?;
    let text = outcome.into_result().map_err(GatewayError::subprocess_failed)?;

    // Only successful results are cached (spec.md §4.6).
    let command_ttl = ttl::ttl_for_command(command, "other");
    ctx.cache.set("command", &params, json!(text), Some(command_ttl)).await;

    Ok(ToolOutcome::new(text, Tier::T3Filesystem, false, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewaySettings;
    use tempfile::tempdir;

    async fn fresh_ctx() -> GatewayContext {
        let dir = tempdir().unwrap();
        GatewayContext::new(GatewaySettings {
            memory_root: dir.path().join(".memory"),
            ..GatewaySettings::default()
        })
        .await
    }

    #[tokio::test]
    async fn blocked_command_never_spawns_a_process() {
        let ctx = fresh_ctx().await;
        let request_args = json!({"command": "rm -rf /"});
        let error = handle(&ctx, &request_args).await.unwrap_err();
        assert_eq!(error.category, devgate_commons::ErrorCategory::CommandBlocked);
    }

    #[tokio::test]
    async fn successful_command_is_cached_and_then_hits() {
        let ctx = fresh_ctx().await;
        let request_args = json!({"command": "echo hello"});
        let first = handle(&ctx, &request_args).await.unwrap();
        assert!(!first.cache_hit);
        assert_eq!(first.text, "hello");

        let second = handle(&ctx, &request_args).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.text, "hello");
    }

    #[tokio::test]
    async fn skip_cache_bypasses_a_warm_entry() {
        let ctx = fresh_ctx().await;
        let request_args = json!({"command": "echo hello"});
        handle(&ctx, &request_args).await.unwrap();

        let skip_args = json!({"command": "echo hello", "skipCache": true});
        let outcome = handle(&ctx, &skip_args).await.unwrap();
        assert!(!outcome.cache_hit);
    }

    #[tokio::test]
    async fn failed_command_is_not_cached() {
        let ctx = fresh_ctx().await;
        let request_args = json!({"command": "exit 7"});
        assert!(handle(&ctx, &request_args).await.is_err());
        let stats = ctx.cache.get_stats().await;
        assert_eq!(stats.disk_size, 0);
    }
}
