//! Upstream origin access.
//!
//! # Data Flow
//! ```text
//! sanitized request
//!     → forwarder.rs (one attempt, no redirects, body buffered)
//!     → UpstreamResponse (status, headers, body bytes)
//! ```
//!
//! # Design Decisions
//! - No retries: a transport error goes straight back to the caller
//! - Responses are buffered so they can be logged and rewritten

pub mod forwarder;

pub use forwarder::{ForwardError, OriginForwarder, UpstreamResponse};
