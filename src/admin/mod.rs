//! Admin API.
//!
//! Read-only views of the proxy's local state, behind a bearer token and
//! served on a separate listener.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::{get_logs, get_status, get_trips};
use crate::config::SharedSwitches;
use crate::http::AppState;
use crate::storage::{AuditLog, TripLedger};

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub ledger: TripLedger,
    pub audit_log: AuditLog,
    pub switches: SharedSwitches,
    pub api_key: Arc<str>,
}

impl AdminState {
    /// Admin view over the proxy's own stores and switches.
    pub fn from_app(app: &AppState, api_key: &str) -> Self {
        Self {
            ledger: app.ledger.clone(),
            audit_log: app.audit_log.clone(),
            switches: app.switches.clone(),
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/trips", get(get_trips))
        .route("/admin/logs", get(get_logs))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
