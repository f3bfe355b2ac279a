//! SQLite-backed key-value store.
//!
//! All tracker state lives in a single `kv` table. Multi-key writes run in
//! one transaction so a record and its aggregate land together or not at all.

use std::path::Path;

use rusqlite::{params, Connection};

use super::KvStore;
use crate::error::StorageError;

/// SQLite database holding the tracker's key-value entries.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::OpenFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate().map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(db)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate().map_err(|e| StorageError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        })?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| StorageError::read("*", e))
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let result = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            });
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::read(key, e)),
        }
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| StorageError::write(&keys, e))?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| StorageError::write(&keys, e))?;
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().map_err(|e| StorageError::write(&keys, e))
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| StorageError::write(keys, e))?;
        for key in keys {
            tx.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map_err(|e| StorageError::write(keys, e))?;
        }
        tx.commit().map_err(|e| StorageError::write(keys, e))
    }
}
