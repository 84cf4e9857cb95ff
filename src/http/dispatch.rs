//! Per-mode request handling.
//!
//! An [`Exchange`] is one classified request. Each handler below runs its
//! mode to completion or to the mode's defined fallback; none of them retry.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;
use chrono::Local;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::config::InterceptConfig;
use crate::http::response::{bad_gateway, internal_error, json_response, relay, relay_with_body};
use crate::http::server::AppState;
use crate::intercept::random::ThreadRandom;
use crate::intercept::register::{apply_register_deduct, build_registration, RegisterError};
use crate::intercept::rewrite::{
    merge_ledger_trips, rewrite_server_time_body, rewrite_ticket_body, TicketRewrite,
};
use crate::intercept::{policy, synth, RewriteTarget};
use crate::security::headers::headers_to_json;
use crate::storage::{AuditTrail, Trip, TripLedger};
use crate::upstream::{ForwardError, UpstreamResponse};

/// A classified request with everything its mode needs.
pub struct Exchange<'a> {
    pub state: &'a AppState,
    pub switches: &'a InterceptConfig,
    pub audit: &'a AuditTrail,
    pub method: Method,
    pub path_and_query: String,
    /// Already stripped of edge headers.
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Ask upstream for an uncompressed body so it can be parsed.
    pub identity_encoding: bool,
}

impl Exchange<'_> {
    /// Serve a synthesized ticket; upstream is never contacted.
    pub async fn fake_ticket(&self) -> Response {
        let now = Local::now();
        let activation = synth::activation_instant(&now);
        let latest = self
            .on_ledger(move |ledger| ledger.latest_after(activation))
            .await
            .ok()
            .flatten();
        let tickets = synth::synthesize(&now, latest);

        match serde_json::to_vec(&tickets) {
            Ok(body) => {
                self.audit.record(&format!(
                    "Fake Ticket Response (no request to origin server): {}",
                    String::from_utf8_lossy(&body)
                ));
                json_response(StatusCode::OK, body)
            }
            Err(e) => {
                self.audit
                    .record_error(&format!("Error serializing fake ticket. Returning 500. {}", e));
                internal_error()
            }
        }
    }

    /// Record the trip locally and answer as the origin would.
    pub async fn local_register(&self) -> Response {
        let raw = self.body.clone().unwrap_or_default();
        let deduct = self.switches.register_deduct;
        let body = if deduct != 0 {
            policy::fail_open(
                self.audit,
                "applying REGISTER_DEDUCT",
                apply_register_deduct(&raw, deduct).map(Bytes::from),
                raw,
            )
        } else {
            raw
        };

        match self.register(&body).await {
            Ok(trip) => match serde_json::to_vec(&trip) {
                Ok(json) => json_response(StatusCode::OK, json),
                Err(_) => internal_error(),
            },
            Err(e) => {
                self.audit.record_error(&format!(
                    "Error parsing request body for /api/Trip/register. Returning 500. {}",
                    e
                ));
                internal_error()
            }
        }
    }

    async fn register(&self, body: &[u8]) -> Result<Trip, RegisterError> {
        let trip = build_registration(body, Uuid::new_v4())?;
        self.audit.record(&format!(
            "Origin Response Body: {}",
            serde_json::to_string_pretty(&trip)?
        ));
        let record = trip.clone();
        self.on_ledger(move |ledger| ledger.append(&record)).await??;
        Ok(trip)
    }

    /// Real ticket with ledger trips prepended. An unreachable origin falls
    /// back to a plain pass-through; everything else is a single attempt.
    pub async fn local_ticket(&self) -> Response {
        let upstream = match self.forward(self.identity_encoding).await {
            Ok(upstream) => upstream,
            Err(e) => {
                self.audit.record_error(&format!(
                    "Error retrieving or modifying ticket data. Falling back to origin. {}",
                    e
                ));
                return self.pass_through().await;
            }
        };

        if !upstream.status.is_success() {
            self.audit.record(&format!(
                "Origin answered {} to ticket request. Returning original response to client.",
                upstream.status
            ));
            return relay(upstream);
        }

        let ledger = self.ledger_trips().await;
        let merged = policy::fail_closed(
            self.audit,
            "retrieving or modifying ticket data",
            merge_ledger_trips(&upstream.body, &ledger).map(Some),
            None,
        );

        match merged {
            Some(body) => {
                self.audit.record(&format!(
                    "Modified Response Body for Client: {}",
                    String::from_utf8_lossy(&body)
                ));
                json_response(StatusCode::OK, body)
            }
            None => relay(upstream),
        }
    }

    /// Forward, then rewrite a successful body. Rewrite failures hand back the
    /// upstream body untouched.
    pub async fn rewrite(&self, target: RewriteTarget) -> Response {
        let upstream = match self.forward(self.identity_encoding).await {
            Ok(upstream) => upstream,
            Err(e) => return self.upstream_failed(e),
        };

        if !upstream.status.is_success() {
            self.audit.record("Returning original response to client.");
            return relay(upstream);
        }

        let original = upstream.body.to_vec();
        let body = match target {
            RewriteTarget::Ticket => {
                let ledger = if self.switches.act_as_server {
                    self.ledger_trips().await
                } else {
                    Vec::new()
                };
                let options = TicketRewrite {
                    time_deduct: self.switches.ticket_time_deduct,
                    randomize_trip_identity: self.switches.randomize_trip_identity,
                };
                policy::fail_closed(
                    self.audit,
                    "modifying JSON for /api/Tickets/get",
                    rewrite_ticket_body(&upstream.body, &options, &ledger, &mut ThreadRandom),
                    original,
                )
            }
            RewriteTarget::ServerTime => policy::fail_closed(
                self.audit,
                "modifying JSON for /api/Tickets/get_unix_datetime",
                rewrite_server_time_body(&upstream.body, self.switches.unix_deduct),
                original,
            ),
        };

        self.audit.record(&format!(
            "Modified Response Body for Client: {}",
            String::from_utf8_lossy(&body)
        ));
        relay_with_body(upstream, body)
    }

    /// Forward and relay unchanged.
    pub async fn pass_through(&self) -> Response {
        match self.forward(false).await {
            Ok(upstream) => {
                self.audit.record("Returning original response to client.");
                relay(upstream)
            }
            Err(e) => self.upstream_failed(e),
        }
    }

    async fn forward(&self, identity_encoding: bool) -> Result<UpstreamResponse, ForwardError> {
        let upstream = self
            .state
            .forwarder
            .forward(
                self.method.clone(),
                &self.path_and_query,
                self.headers.clone(),
                self.body.clone(),
                identity_encoding,
            )
            .await?;

        self.audit
            .record(&format!("Origin Response Status: {}", upstream.status.as_u16()));
        self.audit.record(&format!(
            "Origin Response Headers: {}",
            headers_to_json(&upstream.headers)
        ));
        self.audit.record(&format!(
            "Origin Response Body: {}",
            String::from_utf8_lossy(&upstream.body)
        ));
        Ok(upstream)
    }

    /// Run a ledger operation on the blocking pool.
    async fn on_ledger<T, F>(&self, op: F) -> Result<T, JoinError>
    where
        T: Send + 'static,
        F: FnOnce(&TripLedger) -> T + Send + 'static,
    {
        let ledger = self.state.ledger.clone();
        let result = tokio::task::spawn_blocking(move || op(&ledger)).await;
        if let Err(e) = &result {
            self.audit.record_error(&format!("Ledger task failed. {}", e));
        }
        result
    }

    async fn ledger_trips(&self) -> Vec<Trip> {
        self.on_ledger(|ledger| ledger.list_descending_by_time())
            .await
            .unwrap_or_default()
    }

    fn upstream_failed(&self, error: ForwardError) -> Response {
        self.audit.record_error(&format!(
            "Error forwarding {} {} to origin. {}",
            self.method, self.path_and_query, error
        ));
        bad_gateway()
    }
}
