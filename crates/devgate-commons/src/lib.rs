//! Shared primitives reused across the devgate workspace: path normalization,
//! allowed-base resolution, the canonical-JSON cache key derivation, and the
//! error-category taxonomy surfaced at the RPC boundary.

pub mod error_category;
pub mod ident;
pub mod keys;
pub mod paths;

pub use error_category::ErrorCategory;
pub use paths::AllowedBases;
