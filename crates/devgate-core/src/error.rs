//! Typed handler error (spec.md §7). Every tool handler returns
//! `GatewayResult<T>`; the RPC layer converts an `Err` into
//! `{content:[{type:"text", text}], isError:true}` without ever propagating
//! a panic to the client.
//!
//! Grounded on `vtcode-commons/src/error_category.rs`'s category-plus-message
//! shape.

use devgate_commons::ErrorCategory;
use std::fmt;

#[derive(Debug, Clone, thiserror::Error)]
pub struct GatewayError {
    pub category: ErrorCategory,
    pub message: String,
}

impl GatewayError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidInput, message)
    }

    pub fn path_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::PathDenied, message)
    }

    pub fn command_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::CommandBlocked, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn subprocess_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::SubprocessFailed, message)
    }

    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::UpstreamUnavailable, message)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
