//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ticket_edge_requests_total` (counter): requests by handling mode, status
//! - `ticket_edge_request_duration_seconds` (histogram): latency by mode
//! - `ticket_edge_ledger_appends_total` (counter): trips written to the ledger

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(mode: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "ticket_edge_requests_total",
        "mode" => mode,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("ticket_edge_request_duration_seconds", "mode" => mode)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_ledger_append() {
    metrics::counter!("ticket_edge_ledger_appends_total").increment(1);
}
