//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!     → storage::audit (capped request/response snapshots)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Admin API (/admin/logs)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every request log line
//! - Metrics are cheap (atomic increments); no recorder means no-op

pub mod logging;
pub mod metrics;
