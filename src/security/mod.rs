//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (drop edge/CDN client identification)
//!     → headers.rs (strip hop-by-hop before forwarding)
//!     → Pass to upstream
//! Upstream response:
//!     → headers.rs (strip hop-by-hop before relaying)
//! ```
//!
//! # Design Decisions
//! - Client credentials are passed through untouched; the proxy does not
//!   authenticate ticketing traffic
//! - The admin API has its own bearer check (see `admin::auth`)

pub mod headers;
