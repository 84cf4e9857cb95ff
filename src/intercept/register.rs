//! Local trip registration.
//!
//! # Responsibilities
//! - Apply the registration time deduction to the raw request body
//! - Turn a registration body into a ledger [`Trip`] with a fresh id
//!
//! # Design Decisions
//! - The deduction is best effort: a body it cannot adjust is used as-is
//! - Building the trip is strict: anything missing or malformed is an error
//!   and nothing reaches the ledger

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{StorageError, Trip};
use crate::util::{parse_int_prefix, whole_seconds};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid registration body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registration body is not a JSON object")]
    NotAnObject,

    #[error("registration field `{0}` is missing or not a string")]
    MissingField(&'static str),

    #[error("registration time is not an integer")]
    InvalidTime,

    #[error("failed to save trip: {0}")]
    Ledger(#[from] StorageError),

    #[error("ledger task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Subtract `deduct` from the body's `time`, re-encoding it as a string the
/// way clients send it.
pub fn apply_register_deduct(body: &[u8], deduct: i64) -> Result<Vec<u8>, RegisterError> {
    let mut payload: Value = serde_json::from_slice(body)?;
    if !payload.is_object() {
        return Err(RegisterError::NotAnObject);
    }
    let time = read_time(&payload)?
        .checked_sub(deduct)
        .ok_or(RegisterError::InvalidTime)?;
    payload["time"] = Value::from(time.to_string());
    Ok(serde_json::to_vec(&payload)?)
}

/// Build the ledger record echoed back to the client.
pub fn build_registration(body: &[u8], id: Uuid) -> Result<Trip, RegisterError> {
    let payload: Value = serde_json::from_slice(body)?;
    if !payload.is_object() {
        return Err(RegisterError::NotAnObject);
    }

    Ok(Trip {
        id: id.to_string(),
        time: read_time(&payload)?,
        vehicle_nr: text_field(&payload, "vehicle_nr")?,
        ticket_id: text_field(&payload, "ticket_id")?,
        signature: text_field(&payload, "signature")?,
    })
}

fn read_time(payload: &Value) -> Result<i64, RegisterError> {
    match payload.get("time") {
        Some(Value::String(s)) => parse_int_prefix(s).ok_or(RegisterError::InvalidTime),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_seconds))
            .ok_or(RegisterError::InvalidTime),
        _ => Err(RegisterError::InvalidTime),
    }
}

/// Strings pass through; numbers are rendered in decimal.
fn text_field(payload: &Value, name: &'static str) -> Result<String, RegisterError> {
    match payload.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(RegisterError::MissingField(name)),
    }
}
