//! SQLite-backed preference store.

use crate::store::{PreferenceStore, StoreError};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Preference store persisted in a single-table SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at `path`. Creates parent dirs if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prefs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_utc INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl PreferenceStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut stmt = conn.prepare("SELECT value FROM prefs WHERE key = ?1")?;
        let row = stmt.query_row([key], |r| r.get::<_, String>(0)).optional()?;
        Ok(row)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let updated = time::OffsetDateTime::now_utc().unix_timestamp();
        let conn = self
            .conn
            .lock()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO prefs (key, value, updated_utc) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, updated],
        )?;
        Ok(())
    }
}
