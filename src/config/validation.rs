//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Upstream base URL is an absolute http(s) origin
//! - Bind addresses parse as socket addresses
//! - Admin API is never enabled without a key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url is not a valid URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("upstream.base_url must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("upstream.base_url must not carry a path, query or fragment")]
    UpstreamHasPath,

    #[error("{field} is not a socket address: {value}")]
    InvalidBindAddress { field: &'static str, value: String },

    #[error("listener.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,

    #[error("storage.database_path must not be empty")]
    EmptyDatabasePath,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::UpstreamHasPath);
            }
        }
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl(e.to_string())),
    }

    check_bind(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_bind(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_bind(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::MissingAdminKey);
        }
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.storage.database_path.is_empty() {
        errors.push(ValidationError::EmptyDatabasePath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bind(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field,
            value: value.to_string(),
        });
    }
}
