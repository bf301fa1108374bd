//! SQLite-based preference and history storage.
//!
//! Provides persistent storage for:
//! - Key-value preferences (session settings and snapshots)
//! - Completed phase history and its statistics

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::prefs::{PrefValue, PreferenceStore};
use crate::error::StoreError;
use crate::timer::Phase;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: i64,
    pub phase: Phase,
    pub duration_secs: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HistorySummary {
    pub work_sessions: u64,
    pub focus_secs: u64,
    pub short_breaks: u64,
    pub long_breaks: u64,
    pub break_secs: u64,
}

/// SQLite database holding the `kv` preference table and the phase history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS phases (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                phase         TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                completed_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_phases_completed_at ON phases(completed_at);",
        )?;
        Ok(())
    }

    /// Get a raw value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a raw value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Record a completed phase.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_phase(
        &self,
        phase: Phase,
        duration_secs: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO phases (phase, duration_secs, completed_at) VALUES (?1, ?2, ?3)",
            params![phase.as_str(), duration_secs, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent phases first.
    pub fn recent_phases(&self, limit: usize) -> Result<Vec<PhaseRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phase, duration_secs, completed_at
             FROM phases
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, phase, duration_secs, completed_at) = row?;
            let Some(phase) = Phase::parse(&phase) else {
                continue;
            };
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default();
            records.push(PhaseRecord {
                id,
                phase,
                duration_secs,
                completed_at,
            });
        }
        Ok(records)
    }

    pub fn summary_today(&self) -> Result<HistorySummary, rusqlite::Error> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.summary_since(&format!("{today}T00:00:00+00:00"))
    }

    pub fn summary_all(&self) -> Result<HistorySummary, rusqlite::Error> {
        self.summary_since("")
    }

    fn summary_since(&self, since: &str) -> Result<HistorySummary, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT phase, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM phases
             WHERE completed_at >= ?1
             GROUP BY phase",
        )?;

        let mut summary = HistorySummary::default();
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        for row in rows {
            let (phase, count, secs) = row?;
            match Phase::parse(&phase) {
                Some(Phase::Work) => {
                    summary.work_sessions += count;
                    summary.focus_secs += secs;
                }
                Some(Phase::ShortBreak) => {
                    summary.short_breaks += count;
                    summary.break_secs += secs;
                }
                Some(Phase::LongBreak) => {
                    summary.long_breaks += count;
                    summary.break_secs += secs;
                }
                _ => {}
            }
        }
        Ok(summary)
    }
}

impl PreferenceStore for Database {
    fn get(&self, key: &str) -> Result<Option<PrefValue>, StoreError> {
        match self.kv_get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        let json = serde_json::to_string(&value)?;
        self.kv_set(key, &json)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.kv_remove(key)?;
        Ok(())
    }
}
