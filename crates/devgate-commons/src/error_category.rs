//! Canonical error taxonomy surfaced at the RPC boundary.
//!
//! Grounded on `vtcode-commons/src/error_category.rs`'s unified-category
//! approach: a single enum every crate converts into, rather than each
//! handler inventing its own error shape. devgate's taxonomy is the eight
//! error kinds spec.md §7 names exactly, so handler code and tests can match
//! on `ErrorCategory` instead of parsing message strings.

use std::fmt;

/// One of the error kinds a tool handler, the router, or the RPC loop can
/// surface. None of these ever crash the process; they are always converted
/// to `isError: true` content at the response boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Missing or malformed argument (empty path, bad project id, oversize query).
    InvalidInput,
    /// Path outside allowed roots, or it hit the secret-location denylist.
    PathDenied,
    /// Command matched a blocked pattern in the security validator.
    CommandBlocked,
    /// Requested project, index, or file is absent.
    NotFound,
    /// Subprocess or model call exceeded its time budget.
    Timeout,
    /// Helper process exited non-zero.
    SubprocessFailed,
    /// Local model runner is unreachable when a handler required it.
    UpstreamUnavailable,
    /// RPC line could not be parsed as JSON.
    ParseError,
}

impl ErrorCategory {
    /// Whether a failure in this category already guarantees no resource was
    /// opened or process spawned (true for every *_Denied/*_Blocked/*_Invalid
    /// kind emitted by the security validator before it hands off downstream).
    pub fn is_pre_execution(self) -> bool {
        matches!(
            self,
            Self::InvalidInput | Self::PathDenied | Self::CommandBlocked
        )
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidInput => "invalid_input",
            Self::PathDenied => "path_denied",
            Self::CommandBlocked => "command_blocked",
            Self::NotFound => "not_found",
            Self::Timeout => "timeout",
            Self::SubprocessFailed => "subprocess_failed",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::ParseError => "parse_error",
        };
        f.write_str(label)
    }
}
