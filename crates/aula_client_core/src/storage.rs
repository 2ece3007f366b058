//! SQLite storage for client-side state: a single key/value config table.
//! The session token and user live here so a restart keeps the user logged in.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

pub const DB_FILE: &str = "aula.db";

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open (creating if needed) `aula.db` inside `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join(DB_FILE);
        debug!(db = ?db_path, "opening storage");
        let conn = Connection::open(&db_path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("CREATE TABLE IF NOT EXISTS config (key TEXT PRIMARY KEY, value TEXT);")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_db<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, rusqlite::Error>,
    {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(f(&conn)?)
    }

    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        self.with_db(|conn| {
            conn.query_row("SELECT value FROM config WHERE key = ?1", params![key], |row| row.get(0))
                .optional()
        })
    }

    pub fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.with_db(|conn| {
            conn.execute(
                "INSERT INTO config (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn config_remove(&self, key: &str) -> Result<()> {
        self.with_db(|conn| {
            conn.execute("DELETE FROM config WHERE key = ?1", params![key])?;
            Ok(())
        })
    }
}
