//! Wire-level request/response shapes and the method handlers for the stdio
//! RPC loop (spec.md §4.8, §6.1). Grounded on the teacher's
//! `mcp/rmcp_transport.rs` line-transport shape, adapted from client-side to
//! server-side.

use devgate_core::context::GatewayContext;
use devgate_core::tools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "devgate";

/// A best-effort extraction of `"id":<value>` from a line that failed to
/// parse as JSON, so a parse-error response can still carry the right
/// correlation id (spec.md §4.8: "if an id can be recovered... otherwise
/// remain silent").
static ID_SCAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""id"\s*:\s*("(?:[^"\\]|\\.)*"|-?\d+|null)"#).expect("id-scan pattern must compile")
});

pub struct ParsedRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: Value,
}

pub enum ParseOutcome {
    Request(ParsedRequest),
    /// The line could not be parsed, but an `id` was recoverable.
    RecoverableParseError(Value),
    /// The line could not be parsed and no `id` could be recovered; stay silent.
    Unrecoverable,
}

pub fn parse_line(line: &str) -> ParseOutcome {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => {
            let id = value.get("id").cloned();
            let method = match value.get("method").and_then(Value::as_str) {
                Some(method) => method.to_string(),
                None => return recover_or_silent(line),
            };
            let params = value.get("params").cloned().unwrap_or(Value::Null);
            ParseOutcome::Request(ParsedRequest { id, method, params })
        }
        Err(_) => recover_or_silent(line),
    }
}

fn recover_or_silent(line: &str) -> ParseOutcome {
    match ID_SCAN.captures(line).and_then(|c| c.get(1)) {
        Some(raw_id) => match serde_json::from_str::<Value>(raw_id.as_str()) {
            Ok(id) => ParseOutcome::RecoverableParseError(id),
            Err(_) => ParseOutcome::Unrecoverable,
        },
        None => ParseOutcome::Unrecoverable,
    }
}

pub fn success_envelope(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

pub fn error_envelope(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message.into()}})
}

fn tool_content(text: impl Into<String>, is_error: bool) -> Value {
    json!({"content": [{"type": "text", "text": text.into()}], "isError": is_error})
}

/// Handle one parsed request, returning `None` for notifications (no
/// response is ever emitted for those).
pub async fn handle_request(ctx: &GatewayContext, request: ParsedRequest) -> Option<Value> {
    let ParsedRequest { id, method, params } = request;

    // `id` absent => notification; every notification (including unknown
    // ones) is accepted and silently dropped (spec.md §4.8).
    let Some(id) = id else {
        if method == "notifications/initialized" {
            tracing::debug!("client initialized");
        } else if method == "notifications/cancelled" {
            tracing::debug!("cancellation notification dropped (not supported)");
        }
        return None;
    };

    let response = match method.as_str() {
        "initialize" => {
            if let Some(cwd) = params.get("cwd").and_then(Value::as_str) {
                ctx.set_client_cwd(std::path::PathBuf::from(cwd)).await;
            }
            success_envelope(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")}
                }),
            )
        }
        "tools/list" => {
            let catalog = tools::catalog();
            let tool_list: Vec<Value> = catalog
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "inputSchema": tool.input_schema
                    })
                })
                .collect();
            success_envelope(id, json!({"tools": tool_list}))
        }
        "tools/call" => {
            let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
            match tools::dispatch(ctx, name, &arguments).await {
                Ok(outcome) => success_envelope(id, tool_content(outcome.text, false)),
                Err(error) => success_envelope(id, tool_content(error.to_string(), true)),
            }
        }
        other => error_envelope(id, -32601, format!("method not found: {other}")),
    };

    Some(response)
}
