//! Hot-reloadable switches shared by request handlers.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::config::schema::{InterceptConfig, ProxyConfig};

/// The part of the configuration a running server picks up without a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Switches {
    pub intercept: InterceptConfig,
    pub audit_enabled: bool,
}

impl Switches {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            intercept: config.intercept.clone(),
            audit_enabled: config.storage.audit_enabled,
        }
    }
}

/// Lock-free handle; requests `load_full` once and keep that snapshot.
pub type SharedSwitches = Arc<ArcSwap<Switches>>;

pub fn shared(config: &ProxyConfig) -> SharedSwitches {
    Arc::new(ArcSwap::from_pointee(Switches::from_config(config)))
}

/// Publish the switches of a reloaded config. Returns whether anything changed.
pub fn apply_update(shared: &SharedSwitches, config: &ProxyConfig) -> bool {
    let next = Switches::from_config(config);
    if **shared.load() == next {
        return false;
    }
    tracing::info!(
        act_as_server = next.intercept.act_as_server,
        fake_ticket = next.intercept.fake_ticket,
        ticket_time_deduct = next.intercept.ticket_time_deduct,
        unix_deduct = next.intercept.unix_deduct,
        register_deduct = next.intercept.register_deduct,
        randomize_trip_identity = next.intercept.randomize_trip_identity,
        audit_enabled = next.audit_enabled,
        "Intercept switches reloaded"
    );
    shared.store(Arc::new(next));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update_swaps_snapshot() {
        let mut config = ProxyConfig::default();
        let switches = shared(&config);
        let before = switches.load_full();

        assert!(!apply_update(&switches, &config));

        config.intercept.fake_ticket = true;
        config.storage.audit_enabled = false;
        assert!(apply_update(&switches, &config));

        // snapshots already handed out stay unchanged
        assert!(!before.intercept.fake_ticket);
        let after = switches.load_full();
        assert!(after.intercept.fake_ticket);
        assert!(!after.audit_enabled);
    }

    #[test]
    fn test_non_reloadable_fields_ignored() {
        let mut config = ProxyConfig::default();
        let switches = shared(&config);
        config.upstream.base_url = "http://127.0.0.1:1".to_string();
        assert!(!apply_update(&switches, &config));
    }
}
