// SQLite persistence layer: a small key-value blob store holding the roster.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::roster::participant::Participant;

/// Blob key the roster is stored under.
pub const ROSTER_KEY: &str = "hr-members";

/// SQLite-backed key-value store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the table
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS app_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn put_blob(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("failed to write blob {key}"))?;
        Ok(())
    }

    /// Read the value stored under `key`. `None` if the key was never written.
    pub fn get_blob(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to read blob {key}"))
    }

    /// Serialize the full roster as a JSON array under [`ROSTER_KEY`].
    pub fn save_roster(&self, participants: &[Participant]) -> Result<()> {
        let json =
            serde_json::to_string(participants).context("failed to serialize roster")?;
        self.put_blob(ROSTER_KEY, &json)
    }

    /// Load the stored roster.
    ///
    /// `Ok(None)` when nothing was saved yet; an error when the blob exists
    /// but is not a JSON array of participants.
    pub fn load_roster(&self) -> Result<Option<Vec<Participant>>> {
        let Some(json) = self.get_blob(ROSTER_KEY)? else {
            return Ok(None);
        };
        let participants: Vec<Participant> =
            serde_json::from_str(&json).context("stored roster is not valid JSON")?;
        Ok(Some(participants))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
