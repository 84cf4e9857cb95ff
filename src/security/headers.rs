//! Header sanitization.
//!
//! # Responsibilities
//! - Remove edge/CDN headers that identify the client before forwarding
//! - Strip hop-by-hop headers in both directions
//! - Force an identity-encoded upstream body when it will be rewritten
//!
//! # Design Decisions
//! - Sanitization copies; the inbound header map is kept for logging
//! - Headers listed in `Connection` are hop-by-hop too (RFC 9110 §7.6.1)
//! - `host` and `content-length` are left to the transport to recompute

use axum::http::header::{self, HeaderMap, HeaderName};

/// Headers added by the edge network that must never reach the origin.
pub const EDGE_HEADERS: [&str; 7] = [
    "cf-connecting-ip",
    "cf-ipcountry",
    "cf-ray",
    "cf-visitor",
    "x-forwarded-proto",
    "x-real-ip",
    "x-forwarded-for",
];

const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::PROXY_AUTHENTICATE,
];

const KEEP_ALIVE: &str = "keep-alive";
const PROXY_CONNECTION: &str = "proxy-connection";

/// Copy of `headers` without [`EDGE_HEADERS`].
pub fn sanitize_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = headers.clone();
    for name in EDGE_HEADERS {
        sanitized.remove(name);
    }
    sanitized
}

/// Prepare sanitized headers for the upstream request.
pub fn prepare_upstream_headers(headers: &mut HeaderMap, identity_encoding: bool) {
    strip_hop_by_hop(headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    if identity_encoding {
        headers.remove(header::ACCEPT_ENCODING);
    }
}

/// Prepare upstream response headers for the client. The body is re-framed,
/// so the length is recomputed.
pub fn prepare_client_headers(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
    headers.remove(header::CONTENT_LENGTH);
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(KEEP_ALIVE);
    headers.remove(PROXY_CONNECTION);
}

/// Headers as a pretty JSON object, for the audit trail.
pub fn headers_to_json(headers: &HeaderMap) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                serde_json::Value::from(String::from_utf8_lossy(v.as_bytes()).into_owned()),
            )
        })
        .collect();
    serde_json::to_string_pretty(&map).unwrap_or_default()
}
