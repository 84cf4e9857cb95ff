//! Request classification.
//!
//! # Responsibilities
//! - Map (method, path, switches) to exactly one handling [`Mode`]
//! - Keep branch priority explicit and free of I/O
//!
//! # Priority
//! ```text
//! 1. FakeTicket     fake_ticket   && GET  /api/Tickets/get
//! 2. LocalRegister  act_as_server && POST /api/Trip/register
//! 3. LocalTicket    act_as_server && GET  /api/Tickets/get
//! 4. Rewrite        /api/Tickets/get, or /api/Tickets/get_unix_datetime with unix_deduct != 0
//! 5. PassThrough    everything else
//! ```

use axum::http::Method;

use crate::config::InterceptConfig;

pub const TICKETS_PATH: &str = "/api/Tickets/get";
pub const REGISTER_PATH: &str = "/api/Trip/register";
pub const SERVER_TIME_PATH: &str = "/api/Tickets/get_unix_datetime";

/// Upstream responses the rewriter knows how to transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteTarget {
    Ticket,
    ServerTime,
}

/// How a single request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Synthesize a ticket; upstream is never contacted.
    FakeTicket,
    /// Record the trip in the ledger and answer locally.
    LocalRegister,
    /// Fetch the real ticket and prepend ledger trips.
    LocalTicket,
    /// Forward, then rewrite the upstream body.
    Rewrite(RewriteTarget),
    /// Forward and relay unchanged.
    PassThrough,
}

impl Mode {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::FakeTicket => "fake_ticket",
            Mode::LocalRegister => "local_register",
            Mode::LocalTicket => "local_ticket",
            Mode::Rewrite(RewriteTarget::Ticket) => "rewrite_ticket",
            Mode::Rewrite(RewriteTarget::ServerTime) => "rewrite_server_time",
            Mode::PassThrough => "pass_through",
        }
    }

    /// Whether the upstream body will be parsed as JSON.
    pub fn reads_upstream_body(&self) -> bool {
        matches!(self, Mode::LocalTicket | Mode::Rewrite(_))
    }
}

/// Select the handling mode. First match wins.
pub fn classify(method: &Method, path: &str, switches: &InterceptConfig) -> Mode {
    let is_get = method == Method::GET;

    if switches.fake_ticket && is_get && path == TICKETS_PATH {
        return Mode::FakeTicket;
    }
    if switches.act_as_server && method == Method::POST && path == REGISTER_PATH {
        return Mode::LocalRegister;
    }
    if switches.act_as_server && is_get && path == TICKETS_PATH {
        return Mode::LocalTicket;
    }
    if path == TICKETS_PATH {
        return Mode::Rewrite(RewriteTarget::Ticket);
    }
    if path == SERVER_TIME_PATH && switches.unix_deduct != 0 {
        return Mode::Rewrite(RewriteTarget::ServerTime);
    }
    Mode::PassThrough
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switches(fake_ticket: bool, act_as_server: bool, unix_deduct: i64) -> InterceptConfig {
        InterceptConfig {
            fake_ticket,
            act_as_server,
            unix_deduct,
            ..Default::default()
        }
    }

    #[test]
    fn test_fake_ticket_wins_over_server_mode() {
        let mode = classify(&Method::GET, TICKETS_PATH, &switches(true, true, 0));
        assert_eq!(mode, Mode::FakeTicket);
    }

    #[test]
    fn test_fake_ticket_requires_get() {
        let mode = classify(&Method::POST, TICKETS_PATH, &switches(true, false, 0));
        assert_eq!(mode, Mode::Rewrite(RewriteTarget::Ticket));
    }

    #[test]
    fn test_server_mode_routes() {
        let on = switches(false, true, 0);
        assert_eq!(classify(&Method::POST, REGISTER_PATH, &on), Mode::LocalRegister);
        assert_eq!(classify(&Method::GET, TICKETS_PATH, &on), Mode::LocalTicket);
        assert_eq!(classify(&Method::GET, REGISTER_PATH, &on), Mode::PassThrough);
    }

    #[test]
    fn test_register_forwarded_without_server_mode() {
        let off = switches(false, false, 0);
        assert_eq!(classify(&Method::POST, REGISTER_PATH, &off), Mode::PassThrough);
    }

    #[test]
    fn test_ticket_always_rewritten_without_interception() {
        let off = switches(false, false, 0);
        assert_eq!(
            classify(&Method::GET, TICKETS_PATH, &off),
            Mode::Rewrite(RewriteTarget::Ticket)
        );
    }

    #[test]
    fn test_server_time_needs_deduction() {
        assert_eq!(
            classify(&Method::GET, SERVER_TIME_PATH, &switches(false, false, 0)),
            Mode::PassThrough
        );
        assert_eq!(
            classify(&Method::GET, SERVER_TIME_PATH, &switches(false, true, 30)),
            Mode::Rewrite(RewriteTarget::ServerTime)
        );
    }

    #[test]
    fn test_paths_match_exactly() {
        let on = switches(true, true, 10);
        assert_eq!(classify(&Method::GET, "/api/Tickets/get/", &on), Mode::PassThrough);
        assert_eq!(classify(&Method::GET, "/api/tickets/get", &on), Mode::PassThrough);
        assert_eq!(classify(&Method::GET, "/", &on), Mode::PassThrough);
    }

    #[test]
    fn test_only_rewrite_modes_read_upstream_body() {
        assert!(Mode::LocalTicket.reads_upstream_body());
        assert!(Mode::Rewrite(RewriteTarget::ServerTime).reads_upstream_body());
        assert!(!Mode::PassThrough.reads_upstream_body());
        assert!(!Mode::FakeTicket.reads_upstream_body());
    }
}
