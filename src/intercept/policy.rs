//! Named error-handling policies.
//!
//! - fail-open-with-log: log and continue with a fallback value
//! - fail-closed-return-original: log and hand back the untouched input
//! - fail-hard: propagate with `?` and map to a status at the HTTP edge
//!
//! The first two live here so every component suppresses errors the same way.

use std::fmt::Display;

use crate::storage::AuditTrail;

/// Log the failure and continue with `fallback`.
pub fn fail_open<T, E: Display>(audit: &AuditTrail, operation: &str, result: Result<T, E>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            audit.record_error(&format!("Error {}: {}. Continuing.", operation, e));
            fallback
        }
    }
}

/// Log the failure and return the original, untransformed value.
pub fn fail_closed<T, E: Display>(audit: &AuditTrail, operation: &str, result: Result<T, E>, original: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            audit.record_error(&format!(
                "Error {}. Returning original response. {}",
                operation, e
            ));
            original
        }
    }
}
