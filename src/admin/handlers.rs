use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::config::Switches;
use crate::storage::{AuditEntry, Trip};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub switches: Switches,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        switches: Switches::clone(&state.switches.load()),
    })
}

pub async fn get_trips(State(state): State<AdminState>) -> Result<Json<Vec<Trip>>, StatusCode> {
    let ledger = state.ledger.clone();
    tokio::task::spawn_blocking(move || ledger.list_descending_by_time())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "Ledger task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

pub async fn get_logs(
    State(state): State<AdminState>,
) -> Result<Json<Vec<AuditEntry>>, StatusCode> {
    let audit_log = state.audit_log.clone();
    match tokio::task::spawn_blocking(move || audit_log.recent()).await {
        Ok(Ok(entries)) => Ok(Json(entries)),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to read audit log");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            tracing::error!(error = %e, "Audit log task failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
