//! Request handling.
//!
//! # Responsibilities
//! - Read the request ID set by the `SetRequestIdLayer`
//! - Buffer bodies of POST/PUT/PATCH requests for logging and forwarding
//!
//! # Design Decisions
//! - A body that cannot be read is logged and the request continues without
//!   one; it is never a reason to fail the request
//! - Bodies are buffered up to `listener.max_body_bytes`

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method};

use crate::intercept::policy;
use crate::storage::AuditTrail;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID assigned on entry, or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Methods whose body is captured and forwarded.
pub fn method_has_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Buffer the request body. `None` for body-less methods and read failures.
pub async fn capture_body(
    method: &Method,
    body: Body,
    limit: usize,
    audit: &AuditTrail,
) -> Option<Bytes> {
    if !method_has_body(method) {
        return None;
    }

    let read = axum::body::to_bytes(body, limit).await.map(Some);
    let bytes = policy::fail_open(audit, "reading request body", read, None)?;
    audit.record(&format!(
        "Incoming Request Body: {}",
        String::from_utf8_lossy(&bytes)
    ));
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AuditLog, Database};
    use axum::http::HeaderValue;

    fn audit() -> (AuditLog, AuditTrail) {
        let log = AuditLog::new(Database::memory().unwrap());
        (log.clone(), AuditTrail::new(log, true, "req"))
    }

    #[test]
    fn test_request_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[tokio::test]
    async fn test_get_body_not_captured() {
        let (_, audit) = audit();
        let body = capture_body(&Method::GET, Body::from("ignored"), 1024, &audit).await;
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_post_body_captured_and_logged() {
        let (log, audit) = audit();
        let body = capture_body(&Method::POST, Body::from(r#"{"a":1}"#), 1024, &audit).await;
        assert_eq!(body.unwrap(), Bytes::from_static(br#"{"a":1}"#));
        audit.flush_now();
        assert_eq!(log.recent().unwrap()[0].message, r#"Incoming Request Body: {"a":1}"#);
    }

    #[tokio::test]
    async fn test_oversized_body_dropped_not_fatal() {
        let (log, audit) = audit();
        let body = capture_body(&Method::PUT, Body::from(vec![b'x'; 64]), 16, &audit).await;
        assert!(body.is_none());
        audit.flush_now();
        assert!(log.recent().unwrap()[0].message.starts_with("Error reading request body"));
    }
}
