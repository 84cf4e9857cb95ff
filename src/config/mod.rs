//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (ACT_AS_SERVER, TIME, ... environment overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the intercept switches atomically
//!     → next request observes the new snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; each request reads one snapshot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod runtime;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use runtime::{SharedSwitches, Switches};
pub use schema::{
    AdminConfig, InterceptConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, StorageConfig,
    UpstreamConfig,
};
