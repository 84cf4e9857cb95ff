//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (request ID, body capture)
//!     → security::headers (sanitize)
//!     → intercept::classify (pick Mode)
//!     → dispatch.rs (run the mode, maybe via upstream::forwarder)
//!     → response.rs (relay or synthesize)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
