// SQLite store: one `entries` row per submission.
//
// The identifying cells get their own columns for querying; the full row is
// kept as a JSON array so its column order and count survive untouched.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tracing::debug;

use super::{StoreError, SubmissionStore};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the table exists.
    /// Pass `":memory:"` for an ephemeral store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                seq           INTEGER PRIMARY KEY AUTOINCREMENT,
                submission_id TEXT NOT NULL,
                user          TEXT NOT NULL,
                round_label   TEXT NOT NULL,
                cells         TEXT NOT NULL,
                appended_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            CREATE INDEX IF NOT EXISTS idx_entries_round ON entries(round_label);
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned, which only happens after a panic
    /// while holding the lock.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }
}

impl SubmissionStore for SqliteStore {
    fn append(&self, row: &[String]) -> Result<(), StoreError> {
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or_default();
        let cells = serde_json::to_string(row)?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO entries (submission_id, user, round_label, cells)
             VALUES (?1, ?2, ?3, ?4)",
            params![cell(0), cell(1), cell(2), cells],
        )?;

        debug!("appended entry {} to SQLite store", cell(0));
        Ok(())
    }

    fn rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT cells FROM entries ORDER BY seq")?;
        let encoded = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        encoded
            .iter()
            .map(|json| serde_json::from_str::<Vec<String>>(json).map_err(StoreError::from))
            .collect()
    }
}
