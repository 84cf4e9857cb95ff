//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! local-register mode
//!     → ledger.rs (ensure schema, append trip)
//! local-ticket / rewrite / fake-ticket modes
//!     → ledger.rs (list descending, latest after cutoff)
//! every request step
//!     → audit.rs (insert, prune to newest 50)
//! ```
//!
//! # Design Decisions
//! - One SQLite connection behind a mutex; each statement is atomic
//! - Ledger ids are generated by callers (UUID v4), never auto-increment
//! - Audit pruning is by insertion id so clock skew cannot reorder eviction
//! - Read paths degrade to "nothing stored" instead of failing the request

pub mod audit;
pub mod db;
pub mod ledger;
pub mod schema;

pub use audit::{AuditEntry, AuditLog, AuditTrail};
pub use db::{Database, StorageError};
pub use ledger::{Trip, TripLedger};
