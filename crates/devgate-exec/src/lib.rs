//! Bounded subprocess executor (spec.md §4.4).
//!
//! Grounded on `vtcode-bash-runner`: [`executor.rs`]'s `CommandInvocation`
//! and [`process.rs`]'s kill/timeout machinery, re-cast onto `tokio::process`
//! so callers can `.await` a command without blocking the single-threaded RPC
//! loop. Two invocation shapes are modeled, matching spec.md §4.4:
//!
//! - [`spawn_argv`] — absolute executable path + explicit argv, no shell.
//!   Used for every sidecar/helper tool.
//! - [`spawn_shell`] — a single command string interpreted by the system
//!   shell. Reserved for `smart_exec`, which routes the string through
//!   `devgate-core`'s command validator first.

mod output;
mod timeout;

pub use output::{ExecOutcome, ExecStatus};
pub use timeout::ExecError;

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Upper bound on captured stderr, per spec.md §4.4 ("bounded stderr ≤ 4 KiB").
pub const MAX_STDERR_BYTES: usize = 4 * 1024;

/// Default timeout for index/helper-tool subprocesses.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for model-backed subprocesses (local-model bridges).
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);
/// Grace period between SIGTERM and SIGKILL.
pub const KILL_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Run an absolute executable with an explicit argument list, under a hard
/// timeout, escalating from SIGTERM to SIGKILL if the deadline passes.
pub async fn spawn_argv(
    executable: &Path,
    args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<ExecOutcome, ExecError> {
    let mut command = Command::new(executable);
    command.args(args).current_dir(cwd);
    timeout::run_with_timeout(command, timeout).await
}

/// Run a raw command string through the system shell. Callers must validate
/// the command before calling this; devgate-exec performs no validation of
/// its own (spec.md: "shell-mode is reserved for user commands routed
/// through `validateCommand`").
pub async fn spawn_shell(
    command_line: &str,
    cwd: &Path,
    timeout: Duration,
) -> Result<ExecOutcome, ExecError> {
    let mut command = Command::new(shell_program());
    command.arg(shell_flag()).arg(command_line).current_dir(cwd);
    timeout::run_with_timeout(command, timeout).await
}

#[cfg(unix)]
fn shell_program() -> &'static str {
    "sh"
}
#[cfg(unix)]
fn shell_flag() -> &'static str {
    "-c"
}
#[cfg(windows)]
fn shell_program() -> &'static str {
    "cmd"
}
#[cfg(windows)]
fn shell_flag() -> &'static str {
    "/C"
}
