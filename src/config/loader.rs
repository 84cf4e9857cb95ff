//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::util::parse_int_prefix;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then
/// validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the worker-style environment switches on top of `config`.
///
/// Integer switches use leading-integer parsing and fall back to 0.
/// `ACT_AS_SERVER` is on only for the literal `1`; `D1_LOGS=0` disables
/// audit persistence.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let int = |key: &str| lookup(key).map(|v| parse_int_prefix(&v).unwrap_or(0));

    if let Some(value) = lookup("ACT_AS_SERVER") {
        config.intercept.act_as_server = value == "1";
    }
    if let Some(value) = int("TIME") {
        config.intercept.ticket_time_deduct = value;
    }
    if let Some(value) = int("UNIX_DEDUCT") {
        config.intercept.unix_deduct = value;
    }
    if let Some(value) = int("REGISTER_DEDUCT") {
        config.intercept.register_deduct = value;
    }
    if let Some(value) = int("FAKE_TICKET") {
        config.intercept.fake_ticket = value != 0;
    }
    if let Some(value) = lookup("RANDOM_TICKET_ID") {
        config.intercept.randomize_trip_identity =
            value.eq_ignore_ascii_case("true") || parse_int_prefix(&value).unwrap_or(0) != 0;
    }
    if let Some(value) = lookup("D1_LOGS") {
        config.storage.audit_enabled = value != "0";
    }
    if let Some(value) = lookup("UPSTREAM_URL") {
        config.upstream.base_url = value;
    }
    if let Some(value) = lookup("DATABASE_PATH") {
        config.storage.database_path = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> ProxyConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).cloned());
        config
    }

    #[test]
    fn test_env_switches() {
        let config = overrides(&[
            ("ACT_AS_SERVER", "1"),
            ("TIME", "300"),
            ("UNIX_DEDUCT", "60s"),
            ("REGISTER_DEDUCT", "100"),
            ("FAKE_TICKET", "2"),
            ("RANDOM_TICKET_ID", "true"),
            ("D1_LOGS", "0"),
        ]);

        assert!(config.intercept.act_as_server);
        assert_eq!(config.intercept.ticket_time_deduct, 300);
        assert_eq!(config.intercept.unix_deduct, 60);
        assert_eq!(config.intercept.register_deduct, 100);
        assert!(config.intercept.fake_ticket);
        assert!(config.intercept.randomize_trip_identity);
        assert!(!config.storage.audit_enabled);
    }

    #[test]
    fn test_unparseable_numbers_become_zero() {
        let config = overrides(&[("TIME", "soon"), ("FAKE_TICKET", "yes"), ("ACT_AS_SERVER", "true")]);
        assert_eq!(config.intercept.ticket_time_deduct, 0);
        assert!(!config.intercept.fake_ticket);
        // only the literal "1" enables server mode
        assert!(!config.intercept.act_as_server);
    }

    #[test]
    fn test_audit_stays_on_unless_literal_zero() {
        assert!(overrides(&[("D1_LOGS", "1")]).storage.audit_enabled);
        assert!(overrides(&[("D1_LOGS", "off")]).storage.audit_enabled);
        assert!(overrides(&[]).storage.audit_enabled);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.toml");
        fs::write(
            &path,
            "[upstream]\nbase_url = \"http://127.0.0.1:9000\"\n[storage]\ndatabase_path = \":memory:\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.storage.database_path, ":memory:");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.toml");
        fs::write(&path, "[upstream]\nbase_url = \"not a url\"\n").unwrap();

        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Validation(_))));
    }
}
