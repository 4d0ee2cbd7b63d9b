//! Hard-timeout wait loop with SIGTERM -> SIGKILL escalation.
//!
//! Grounded on `vtcode-bash-runner/src/process.rs`'s `ChildTerminator` /
//! `collect_output_until_exit` shape, rewritten against `tokio::process`
//! directly instead of the teacher's channel-fed `ManagedChild` so devgate-exec
//! has no extra dependency on the teacher's event-emission types.

use crate::output::{ExecOutcome, ExecStatus};
use crate::{KILL_GRACE_PERIOD, MAX_STDERR_BYTES};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout as tokio_timeout;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn subprocess: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("command exceeded {timeout_ms}ms timeout")]
    Timeout { timeout_ms: u64 },
}

pub(crate) async fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> Result<ExecOutcome, ExecError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;
    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let stdout_task = tokio::spawn(read_all(stdout));
    let stderr_task = tokio::spawn(read_bounded(stderr, MAX_STDERR_BYTES));

    match tokio_timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok(ExecOutcome {
                status: ExecStatus::from(status),
                stdout,
                stderr,
            })
        }
        Ok(Err(io_error)) => Err(ExecError::Spawn(io_error)),
        Err(_elapsed) => {
            escalate_kill(&mut child).await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ExecError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// SIGTERM, wait up to `KILL_GRACE_PERIOD`, then SIGKILL (spec.md §4.4).
async fn escalate_kill(child: &mut Child) {
    send_sigterm(child);
    if tokio_timeout(KILL_GRACE_PERIOD, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}

#[cfg(unix)]
fn send_sigterm(child: &Child) {
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) {
    // Windows has no SIGTERM; the grace period elapses and kill() (TerminateProcess) runs.
}

async fn read_all(mut reader: impl tokio::io::AsyncRead + Unpin) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Drain the pipe fully (to avoid a blocked writer) but keep only the first
/// `limit` bytes, per spec.md §4.4 "bounded stderr (≤ 4 KiB) to cap memory on
/// runaway output".
async fn read_bounded(reader: impl tokio::io::AsyncRead + Unpin, limit: usize) -> String {
    let mut reader = BufReader::new(reader);
    let mut kept = Vec::with_capacity(limit);
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if kept.len() < limit {
                    let take = (limit - kept.len()).min(n);
                    kept.extend_from_slice(&chunk[..take]);
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&kept).into_owned()
}
