//! Trip ledger: locally registered trips.
//!
//! # Responsibilities
//! - Ensure the `trips` table exists before every access
//! - Append caller-identified trip records
//! - Serve "all trips, newest first" and "latest trip after a cutoff"
//!
//! # Design Decisions
//! - Schema creation is best effort; a failure is logged and the following
//!   statement reports its own error
//! - Reads never fail the request: errors yield an empty result
//! - Equal `time` values are ordered by `id` ascending so reads are stable

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::storage::db::{Database, StorageError};
use crate::storage::schema::TRIPS_SCHEMA;

/// A trip registered through the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub time: i64,
    pub vehicle_nr: String,
    pub ticket_id: String,
    pub signature: String,
}

impl Trip {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            time: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
            vehicle_nr: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ticket_id: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            signature: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        })
    }
}

/// SQLite-backed trip ledger.
#[derive(Clone)]
pub struct TripLedger {
    db: Database,
}

impl TripLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create the `trips` table if it is missing. Never fails.
    pub fn ensure_schema(&self) {
        if let Err(e) = self.try_ensure_schema() {
            tracing::error!(error = %e, "Error creating trips table");
        }
    }

    fn try_ensure_schema(&self) -> Result<(), StorageError> {
        self.db.lock()?.execute_batch(TRIPS_SCHEMA)?;
        Ok(())
    }

    /// Insert one trip. The id must already be globally unique.
    pub fn append(&self, trip: &Trip) -> Result<(), StorageError> {
        self.ensure_schema();
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO trips (id, time, vehicle_nr, ticket_id, signature) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![trip.id, trip.time, trip.vehicle_nr, trip.ticket_id, trip.signature],
        )?;
        metrics::record_ledger_append();
        tracing::debug!(trip_id = %trip.id, time = trip.time, "Trip saved to ledger");
        Ok(())
    }

    /// All trips, newest first. Empty on storage errors.
    pub fn list_descending_by_time(&self) -> Vec<Trip> {
        self.ensure_schema();
        match self.query_descending() {
            Ok(trips) => trips,
            Err(e) => {
                tracing::error!(error = %e, "Error getting saved trips");
                Vec::new()
            }
        }
    }

    fn query_descending(&self) -> Result<Vec<Trip>, StorageError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, time, vehicle_nr, ticket_id, signature FROM trips ORDER BY time DESC, id ASC",
        )?;
        let trips = stmt
            .query_map([], Trip::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trips)
    }

    /// The trip with the greatest `time` strictly after `cutoff`.
    pub fn latest_after(&self, cutoff: i64) -> Option<Trip> {
        self.ensure_schema();
        match self.query_latest_after(cutoff) {
            Ok(trip) => trip,
            Err(e) => {
                tracing::error!(error = %e, cutoff, "Error getting latest trip");
                None
            }
        }
    }

    fn query_latest_after(&self, cutoff: i64) -> Result<Option<Trip>, StorageError> {
        let conn = self.db.lock()?;
        let trip = conn
            .query_row(
                "SELECT id, time, vehicle_nr, ticket_id, signature FROM trips \
                 WHERE time > ?1 ORDER BY time DESC, id ASC LIMIT 1",
                [cutoff],
                Trip::from_row,
            )
            .optional()?;
        Ok(trip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(id: &str, time: i64) -> Trip {
        Trip {
            id: id.to_string(),
            time,
            vehicle_nr: "17123".to_string(),
            ticket_id: "t1".to_string(),
            signature: "s1".to_string(),
        }
    }

    fn ledger() -> TripLedger {
        TripLedger::new(Database::memory().unwrap())
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = ledger();
        assert!(ledger.list_descending_by_time().is_empty());
        assert!(ledger.latest_after(0).is_none());
    }

    #[test]
    fn test_append_then_list_descending() {
        let ledger = ledger();
        ledger.append(&trip("a", 100)).unwrap();
        ledger.append(&trip("b", 300)).unwrap();
        ledger.append(&trip("c", 200)).unwrap();

        let trips = ledger.list_descending_by_time();
        let times: Vec<i64> = trips.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![300, 200, 100]);
        assert!(trips.contains(&trip("c", 200)));
    }

    #[test]
    fn test_equal_times_ordered_by_id() {
        let ledger = ledger();
        ledger.append(&trip("b", 100)).unwrap();
        ledger.append(&trip("a", 100)).unwrap();

        let ids: Vec<String> = ledger
            .list_descending_by_time()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(ledger.latest_after(0).unwrap().id, "a");
    }

    #[test]
    fn test_latest_after_is_strict() {
        let ledger = ledger();
        ledger.append(&trip("before", 995)).unwrap();
        ledger.append(&trip("at", 1000)).unwrap();
        ledger.append(&trip("after", 1005)).unwrap();

        assert_eq!(ledger.latest_after(1000).unwrap().id, "after");
        assert!(ledger.latest_after(1005).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let ledger = ledger();
        ledger.append(&trip("a", 1)).unwrap();
        assert!(ledger.append(&trip("a", 2)).is_err());
        assert_eq!(ledger.list_descending_by_time().len(), 1);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let ledger = ledger();
        ledger.ensure_schema();
        ledger.ensure_schema();
        ledger.append(&trip("a", 1)).unwrap();
        ledger.ensure_schema();
        assert_eq!(ledger.list_descending_by_time().len(), 1);
    }

    #[test]
    fn test_file_backed_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.db");

        TripLedger::new(Database::open(&path).unwrap())
            .append(&trip("persisted", 42))
            .unwrap();

        let reopened = TripLedger::new(Database::open(&path).unwrap());
        assert_eq!(reopened.list_descending_by_time(), vec![trip("persisted", 42)]);
    }
}
