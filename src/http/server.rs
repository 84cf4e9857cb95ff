//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Apply hot-reloaded switches
//! - Classify each request and dispatch to its mode

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{runtime, ProxyConfig, SharedSwitches};
use crate::http::dispatch::Exchange;
use crate::http::request::{capture_body, request_id};
use crate::intercept::{classify, Mode};
use crate::observability::metrics;
use crate::security::headers::{headers_to_json, sanitize_request_headers};
use crate::storage::{AuditLog, AuditTrail, Database, TripLedger};
use crate::upstream::{ForwardError, OriginForwarder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: OriginForwarder,
    pub ledger: TripLedger,
    pub audit_log: AuditLog,
    pub switches: SharedSwitches,
    pub max_body_bytes: usize,
}

/// HTTP server for the ticketing edge proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server over an opened database.
    pub fn new(config: ProxyConfig, db: Database) -> Result<Self, ForwardError> {
        let state = AppState {
            forwarder: OriginForwarder::new(&config.upstream)?,
            ledger: TripLedger::new(db.clone()),
            audit_log: AuditLog::new(db),
            switches: runtime::shared(&config),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs received on `config_updates` replace the intercept switches.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        let switches = self.state.switches.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                if !runtime::apply_update(&switches, &new_config) {
                    tracing::debug!("Config reloaded without switch changes");
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Shared state, for wiring the admin API to the same stores.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Main proxy handler: snapshot switches, capture, sanitize, classify, dispatch.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let switches = state.switches.load_full();

    let (parts, body) = request.into_parts();
    let audit = AuditTrail::new(
        state.audit_log.clone(),
        switches.audit_enabled,
        request_id(&parts.headers),
    );

    let path = parts.uri.path().to_string();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    audit.record("--- New Request ---");
    audit.record(&format!("Received: {} {}", parts.method, path_and_query));
    audit.record(&format!(
        "Original Headers from Client: {}",
        headers_to_json(&parts.headers)
    ));

    let body = capture_body(&parts.method, body, state.max_body_bytes, &audit).await;
    let headers = sanitize_request_headers(&parts.headers);
    audit.record(&format!(
        "Sanitized Headers Forwarded to Origin: {}",
        headers_to_json(&headers)
    ));

    let mode = classify(&parts.method, &path, &switches.intercept);
    tracing::debug!(mode = mode.label(), method = %parts.method, path = %path, "Request classified");

    let response = {
        let exchange = Exchange {
            state: &state,
            switches: &switches.intercept,
            audit: &audit,
            method: parts.method,
            path_and_query,
            headers,
            body,
            identity_encoding: mode.reads_upstream_body(),
        };

        match mode {
            Mode::FakeTicket => exchange.fake_ticket().await,
            Mode::LocalRegister => exchange.local_register().await,
            Mode::LocalTicket => exchange.local_ticket().await,
            Mode::Rewrite(target) => exchange.rewrite(target).await,
            Mode::PassThrough => exchange.pass_through().await,
        }
    };

    metrics::record_request(mode.label(), response.status().as_u16(), start_time);
    audit.flush().await;
    response
}
