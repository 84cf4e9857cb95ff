//! Origin forwarder.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::security::headers::prepare_upstream_headers;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream client: {0}")]
    Client(reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(reqwest::Error),
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends sanitized requests to the real ticketing API.
#[derive(Clone)]
pub struct OriginForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl OriginForwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ForwardError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build().map_err(ForwardError::Client)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute upstream URL for a request path and query.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Forward once. `identity_encoding` asks upstream for an uncompressed
    /// body so it can be parsed.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        mut headers: HeaderMap,
        body: Option<Bytes>,
        identity_encoding: bool,
    ) -> Result<UpstreamResponse, ForwardError> {
        prepare_upstream_headers(&mut headers, identity_encoding);

        let mut request = self
            .client
            .request(method, self.url_for(path_and_query))
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(ForwardError::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(ForwardError::Transport)?;

        Ok(UpstreamResponse { status, headers, body })
    }
}
