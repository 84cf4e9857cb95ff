//! SQLite DDL for the trip ledger and the audit log.

/// Ledger table. Created lazily before every ledger access.
pub const TRIPS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS trips (
    id          TEXT PRIMARY KEY,
    time        INTEGER,
    vehicle_nr  TEXT,
    ticket_id   TEXT,
    signature   TEXT
);
CREATE INDEX IF NOT EXISTS idx_trips_time ON trips(time);
"#;

/// Audit table. `id` is the eviction order.
pub const LOGS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp   TEXT NOT NULL,
    message     TEXT NOT NULL
);
"#;

/// Number of audit rows kept after every insert.
pub const AUDIT_RETENTION: usize = 50;
