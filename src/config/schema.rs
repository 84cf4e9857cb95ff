//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the ticketing edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// The real ticketing API.
    pub upstream: UpstreamConfig,

    /// Interception switches. Hot reloadable.
    pub intercept: InterceptConfig,

    /// Ledger and audit log storage.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body buffered for logging and forwarding.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and authority of the real API, without a path.
    pub base_url: String,

    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Honour HTTP(S)_PROXY environment variables for upstream calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://rsps.westeurope.cloudapp.azure.com".to_string(),
            connect_timeout_secs: 10,
            use_system_proxy: false,
        }
    }
}

/// Switches selecting how the well-known endpoints are handled.
///
/// Every request works on one immutable snapshot of this struct.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InterceptConfig {
    /// Answer trip registrations locally and merge the ledger into tickets.
    pub act_as_server: bool,

    /// Synthesize ticket responses without calling upstream.
    pub fake_ticket: bool,

    /// Seconds subtracted from the first trip of a ticket response.
    pub ticket_time_deduct: i64,

    /// Seconds subtracted from the server time response.
    pub unix_deduct: i64,

    /// Seconds subtracted from a registered trip's time.
    pub register_deduct: i64,

    /// Replace vehicle numbers and jitter times of non-primary trips.
    pub randomize_trip_identity: bool,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path, or ":memory:".
    pub database_path: String,

    /// Persist audit log entries. Hot reloadable.
    pub audit_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "ticket-edge.db".to_string(),
            audit_enabled: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
