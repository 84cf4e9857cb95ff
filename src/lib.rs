//! Ticketing edge proxy.
//!
//! Sits between a mobile ticketing client and the real ticketing API and
//! decides, per request, whether to relay, rewrite, or answer locally.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   TICKET EDGE                    │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐   ┌────────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│  http   │──▶│ intercept  │──▶│  upstream  │──┼──▶ Origin API
//!                     │  │ server  │   │ classifier │   │ forwarder  │  │
//!                     │  └─────────┘   └─────┬──────┘   └─────┬──────┘  │
//!                     │                      │                │         │
//!                     │                      ▼                ▼         │
//!   Client Response   │               ┌────────────┐   ┌────────────┐   │
//!   ◀─────────────────┼───────────────│ synth /    │◀──│  rewrite   │   │
//!                     │               │ register   │   └────────────┘   │
//!                     │               └─────┬──────┘                    │
//!                     │                     ▼                           │
//!                     │        ┌─────────────────────────┐              │
//!                     │        │ storage: ledger + audit │              │
//!                     │        └─────────────────────────┘              │
//!                     │                                                  │
//!                     │  config · observability · security · admin      │
//!                     │  lifecycle                                       │
//!                     └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod intercept;
pub mod storage;
pub mod upstream;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod util;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use storage::Database;
