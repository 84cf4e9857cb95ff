//! Capped audit log of proxy activity.

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::params;
use serde::Serialize;

use crate::storage::db::{Database, StorageError};
use crate::storage::schema::AUDIT_RETENTION;

/// One retained audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub message: String,
}

/// SQLite-backed audit table, pruned to the newest [`AUDIT_RETENTION`] rows.
#[derive(Clone)]
pub struct AuditLog {
    db: Database,
}

impl AuditLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a message and evict everything but the newest rows.
    pub fn insert(&self, message: &str) -> Result<(), StorageError> {
        self.insert_batch(&[(Utc::now().to_rfc3339(), message.to_string())])
    }

    /// Insert `(timestamp, message)` rows in order, then prune, in one
    /// transaction. Readers never observe more than the retained rows.
    pub fn insert_batch(&self, rows: &[(String, String)]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;
        {
            let mut insert = tx.prepare_cached("INSERT INTO logs (timestamp, message) VALUES (?1, ?2)")?;
            for (timestamp, message) in rows {
                insert.execute(params![timestamp, message])?;
            }
        }
        tx.execute(
            "DELETE FROM logs WHERE id NOT IN (SELECT id FROM logs ORDER BY id DESC LIMIT ?1)",
            [AUDIT_RETENTION as i64],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Retained entries, newest first.
    pub fn recent(&self) -> Result<Vec<AuditEntry>, StorageError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare("SELECT id, timestamp, message FROM logs ORDER BY id DESC")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    message: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

/// Per-request audit sink.
///
/// Every message goes to `tracing` immediately. When audit logging is
/// enabled it is also buffered and written by [`AuditTrail::flush`] in a
/// single transaction off the async workers. Persistence failures are logged
/// and dropped.
pub struct AuditTrail {
    log: AuditLog,
    enabled: bool,
    request_id: String,
    pending: Mutex<Vec<(String, String)>>,
}

impl AuditTrail {
    pub fn new(log: AuditLog, enabled: bool, request_id: impl Into<String>) -> Self {
        Self {
            log,
            enabled,
            request_id: request_id.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn record(&self, message: &str) {
        tracing::info!(request_id = %self.request_id, "{}", message);
        self.buffer(message);
    }

    /// Same as [`record`](Self::record) but logged at error level.
    pub fn record_error(&self, message: &str) {
        tracing::error!(request_id = %self.request_id, "{}", message);
        self.buffer(message);
    }

    fn buffer(&self, message: &str) {
        if !self.enabled {
            return;
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.push((Utc::now().to_rfc3339(), message.to_string()));
        }
    }

    /// Write buffered messages on the blocking pool.
    pub async fn flush(self) {
        let request_id = self.request_id.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || self.flush_now()).await {
            tracing::warn!(request_id = %request_id, error = %e, "Audit flush task failed");
        }
    }

    /// Write buffered messages on the current thread.
    pub fn flush_now(&self) {
        let rows = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        if let Err(e) = self.log.insert_batch(&rows) {
            tracing::warn!(request_id = %self.request_id, error = %e, "Failed to write audit log");
        }
    }
}
