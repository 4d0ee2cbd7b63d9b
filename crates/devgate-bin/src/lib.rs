//! The stdio RPC Loop (spec.md §4.8, component C8), factored out of `main`
//! so it can be driven over an in-memory pipe in integration tests, the way
//! the teacher's `vtcode-bash-runner/tests/pipe_tests.rs` drives real pipes
//! rather than mocking internals.

pub mod rpc;

use devgate_core::context::GatewayContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

const CLEANUP_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Drive the RPC loop over `reader`/`writer` until `reader` hits EOF, then
/// flush metrics. A single reader task dispatches one `tokio::spawn`ed
/// handler per request; a single writer task drains an `mpsc` channel, so
/// completion order — not receipt order — determines response order
/// (spec.md §5).
pub async fn serve<R, W>(ctx: Arc<GatewayContext>, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (response_tx, mut response_rx) = mpsc::unbounded_channel::<String>();
    let writer_handle = tokio::spawn(async move {
        while let Some(line) = response_rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let sweep_handle = tokio::spawn(run_cleanup_sweep(ctx.clone()));

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let ctx = ctx.clone();
        let response_tx = response_tx.clone();
        tokio::spawn(async move {
            if let Some(text) = process_line(&ctx, &line).await {
                let _ = response_tx.send(text);
            }
        });
    }

    sweep_handle.abort();
    drop(response_tx);
    let _ = writer_handle.await;
    ctx.metrics.flush().await;
    Ok(())
}

pub async fn process_line(ctx: &GatewayContext, line: &str) -> Option<String> {
    let response = match rpc::parse_line(line) {
        rpc::ParseOutcome::Request(request) => rpc::handle_request(ctx, request).await?,
        rpc::ParseOutcome::RecoverableParseError(id) => rpc::error_envelope(id, -32700, "parse error"),
        rpc::ParseOutcome::Unrecoverable => return None,
    };
    serde_json::to_string(&response).ok()
}

async fn run_cleanup_sweep(ctx: Arc<GatewayContext>) {
    let mut interval = tokio::time::interval(CLEANUP_SWEEP_INTERVAL);
    interval.tick().await; // first tick fires immediately; skip it
    loop {
        interval.tick().await;
        let removed = ctx.cache.cleanup_expired().await;
        if removed > 0 {
            tracing::debug!(removed, "cleanup sweep removed expired cache entries");
        }
    }
}
