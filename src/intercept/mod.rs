//! Interception subsystem: the decision and transformation logic.
//!
//! # Data Flow
//! ```text
//! request (method, path) + InterceptConfig snapshot
//!     → classifier.rs (pure: pick one Mode)
//!     → http::server dispatches on Mode
//!         FakeTicket    → synth.rs (ledger latest-after-activation)
//!         LocalRegister → register.rs (deduct, build trip, ledger append)
//!         LocalTicket   → upstream + rewrite::merge_ledger_trips
//!         Rewrite       → upstream + rewrite.rs (deduct, disguise, merge)
//!         PassThrough   → upstream, relayed unchanged
//! ```
//!
//! # Design Decisions
//! - Everything here is synchronous and I/O free except ledger lookups made
//!   by the caller; the HTTP layer owns transport
//! - Error suppression goes through policy.rs only
//! - Randomness is injected via random.rs

pub mod classifier;
pub mod policy;
pub mod random;
pub mod register;
pub mod rewrite;
pub mod synth;

pub use classifier::{classify, Mode, RewriteTarget};
