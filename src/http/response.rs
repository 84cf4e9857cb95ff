//! Response construction.
//!
//! # Responsibilities
//! - Relay buffered upstream responses (status, headers, body)
//! - Build locally synthesized JSON responses
//! - Map local failures to status codes
//!
//! # Design Decisions
//! - Hop-by-hop headers and the upstream length are dropped; the server
//!   re-frames the body
//! - Upstream transport failures become 502 Bad Gateway

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::security::headers::prepare_client_headers;
use crate::upstream::UpstreamResponse;

/// A locally produced JSON response.
pub fn json_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Relay an upstream response unchanged.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let body = upstream.body.clone();
    relay_with_body(upstream, body)
}

/// Relay upstream status and headers with a replacement body.
pub fn relay_with_body(upstream: UpstreamResponse, body: impl Into<Body>) -> Response {
    let UpstreamResponse {
        status,
        mut headers,
        ..
    } = upstream;
    prepare_client_headers(&mut headers);

    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::HeaderMap;

    fn upstream() -> UpstreamResponse {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json; charset=utf-8"));
        headers.insert("content-length", HeaderValue::from_static("2"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("x-upstream", HeaderValue::from_static("1"));
        UpstreamResponse {
            status: StatusCode::CREATED,
            headers,
            body: Bytes::from_static(b"{}"),
        }
    }

    #[tokio::test]
    async fn test_relay_keeps_status_and_end_to_end_headers() {
        let response = relay_with_body(upstream(), r#"{"a":1}"#);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-upstream"], "1");
        assert!(!response.headers().contains_key("content-length"));
        assert!(!response.headers().contains_key("transfer-encoding"));

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body, Bytes::from_static(br#"{"a":1}"#));
    }

    #[test]
    fn test_json_response() {
        let response = json_response(StatusCode::OK, "[]");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
