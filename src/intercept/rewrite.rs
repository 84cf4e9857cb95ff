//! Response body rewriting.
//!
//! # Responsibilities
//! - Prepend ledger trips to the first ticket
//! - Shift the primary trip's time by the configured deduction
//! - Disguise secondary trips (vehicle number, time jitter)
//! - Shift the server time response
//!
//! # Design Decisions
//! - Pure functions over `serde_json::Value`; callers decide what to do with
//!   errors (see `policy::fail_closed`)
//! - Bodies that do not qualify for a rewrite come back byte-identical
//! - Trips are never dropped or reordered; merges only prepend

use serde_json::Value;
use thiserror::Error;

use crate::intercept::random::RandomSource;
use crate::storage::Trip;
use crate::util::{parse_int_prefix, whole_seconds};

/// Prefixes a disguised vehicle number starts with.
pub const VEHICLE_PREFIXES: [u32; 4] = [17, 16, 57, 35];

/// Largest jitter applied to a secondary trip, in minutes either way.
pub const JITTER_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected shape: {0}")]
    Shape(&'static str),
}

/// Ticket rewrite switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketRewrite {
    pub time_deduct: i64,
    pub randomize_trip_identity: bool,
}

/// Rewrite a ticket-retrieval body.
///
/// Only applies when the first ticket has a non-empty `trips` array; any
/// other well-formed body is returned unchanged. `ledger_trips` (newest
/// first) are prepended before the deduction is applied to index 0.
pub fn rewrite_ticket_body(
    body: &[u8],
    options: &TicketRewrite,
    ledger_trips: &[Trip],
    rng: &mut dyn RandomSource,
) -> Result<Vec<u8>, RewriteError> {
    let mut tickets: Value = serde_json::from_slice(body)?;

    let Some(trips) = primary_trips_mut(&mut tickets)? else {
        return Ok(body.to_vec());
    };
    if trips.is_empty() {
        return Ok(body.to_vec());
    }

    prepend(trips, ledger_trips)?;

    if options.time_deduct != 0 {
        let first = &mut trips[0];
        let time = read_time(first).ok_or(RewriteError::Shape("trips[0].time is not numeric"))?;
        let shifted = time
            .checked_sub(options.time_deduct)
            .ok_or(RewriteError::Shape("trips[0].time out of range"))?;
        first["time"] = Value::from(shifted);
    }

    if options.randomize_trip_identity {
        for trip in trips.iter_mut().skip(1) {
            disguise_trip(trip, rng)?;
        }
    }

    Ok(serde_json::to_vec(&tickets)?)
}

/// Prepend ledger trips to the first ticket when it carries a `trips` array.
///
/// Used by local-ticket serving, where an empty `trips` array still
/// receives the ledger.
pub fn merge_ledger_trips(body: &[u8], ledger_trips: &[Trip]) -> Result<Vec<u8>, RewriteError> {
    let mut tickets: Value = serde_json::from_slice(body)?;
    if !tickets.is_array() {
        return Err(RewriteError::Shape("ticket response is not an array"));
    }

    match primary_trips_mut(&mut tickets)? {
        Some(trips) if !ledger_trips.is_empty() => prepend(trips, ledger_trips)?,
        _ => return Ok(body.to_vec()),
    }

    Ok(serde_json::to_vec(&tickets)?)
}

/// Subtract `deduct` from a server-time body's `time` field.
///
/// A missing or zero `time` leaves the body untouched.
pub fn rewrite_server_time_body(body: &[u8], deduct: i64) -> Result<Vec<u8>, RewriteError> {
    let mut payload: Value = serde_json::from_slice(body)?;

    match read_time(&payload) {
        Some(time) if time != 0 => {
            let shifted = time
                .checked_sub(deduct)
                .ok_or(RewriteError::Shape("time out of range"))?;
            payload["time"] = Value::from(shifted);
            Ok(serde_json::to_vec(&payload)?)
        }
        _ => Ok(body.to_vec()),
    }
}

/// `tickets[0].trips`, if present.
fn primary_trips_mut(tickets: &mut Value) -> Result<Option<&mut Vec<Value>>, RewriteError> {
    let Value::Array(list) = tickets else {
        return Err(RewriteError::Shape("ticket response is not an array"));
    };
    let Some(first) = list.first_mut() else {
        return Ok(None);
    };
    match first.get_mut("trips") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(trips)) => Ok(Some(trips)),
        Some(_) => Err(RewriteError::Shape("tickets[0].trips is not an array")),
    }
}

fn prepend(trips: &mut Vec<Value>, ledger_trips: &[Trip]) -> Result<(), RewriteError> {
    if ledger_trips.is_empty() {
        return Ok(());
    }
    let mut merged = ledger_trips
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    merged.append(trips);
    *trips = merged;
    Ok(())
}

/// Draw order: prefix, suffix, jitter.
fn disguise_trip(trip: &mut Value, rng: &mut dyn RandomSource) -> Result<(), RewriteError> {
    if !trip.is_object() {
        return Err(RewriteError::Shape("trip is not an object"));
    }

    let prefix = VEHICLE_PREFIXES[rng.below(VEHICLE_PREFIXES.len() as u32) as usize];
    let suffix = rng.below(1000);
    trip["vehicle_nr"] = Value::from(format!("{}{:03}", prefix, suffix));

    let jitter = rng.between(-JITTER_MINUTES, JITTER_MINUTES) * 60;
    if let Some(time) = read_time(trip) {
        let jittered = time
            .checked_add(jitter)
            .ok_or(RewriteError::Shape("trip time out of range"))?;
        trip["time"] = Value::from(jittered);
    }
    Ok(())
}

/// `time` as an integer; accepts JSON numbers and numeric strings.
fn read_time(object: &Value) -> Option<i64> {
    match object.get("time")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_seconds)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}
