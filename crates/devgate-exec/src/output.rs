//! Outcome types returned by the executor. Grounded on
//! `vtcode-bash-runner/src/executor.rs`'s `CommandStatus`/`CommandOutput`.

/// Exit status of a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecStatus {
    success: bool,
    code: Option<i32>,
}

impl ExecStatus {
    pub fn new(success: bool, code: Option<i32>) -> Self {
        Self { success, code }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for ExecStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Result of a completed (non-timed-out) subprocess, with stdout/stderr
/// trimmed and stderr capped at [`crate::MAX_STDERR_BYTES`].
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub status: ExecStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutcome {
    /// Resolution policy from spec.md §4.4: exit 0 is success with trimmed
    /// stdout; non-zero is failure with trimmed stderr, or a synthesized
    /// message if stderr was empty.
    pub fn into_result(self) -> Result<String, String> {
        if self.status.success() {
            Ok(self.stdout.trim().to_string())
        } else {
            let message = if self.stderr.trim().is_empty() {
                format!(
                    "command exited with status {}",
                    self.status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                )
            } else {
                self.stderr.trim().to_string()
            };
            Err(message)
        }
    }
}
