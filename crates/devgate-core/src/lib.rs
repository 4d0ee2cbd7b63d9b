//! devgate-core: the Gateway Request Router (spec.md §2).
//!
//! Houses everything downstream of the RPC loop: the security validator
//! (C1), the complexity classifier (C2), the two-level TTL cache (C3),
//! metrics recording (C5), tool handlers (C6), and the router (C7) that ties
//! them together. The stdio loop itself (C8) lives in the `devgate` binary
//! crate, which depends on this one.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod model_client;
pub mod router;
pub mod security;
pub mod tools;
pub mod ttl;

pub use context::GatewayContext;
pub use error::{GatewayError, GatewayResult};
