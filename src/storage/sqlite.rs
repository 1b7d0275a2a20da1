//! `SQLite` key-value store.

use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, DELETE_VALUE_SQL, GET_VALUE_SQL, GET_VERSION_SQL,
    LIST_KEYS_SQL, SCHEMA_SQL, SET_VALUE_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::KeyValueStore;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// SQLite-backed key-value store.
///
/// # Examples
///
/// ```no_run
/// use caption_rs::storage::{KeyValueStore, SqliteStore};
///
/// let mut store = SqliteStore::open("caption-state.db").unwrap();
/// store.set("api_mode", "openai").unwrap();
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a database at the given path and initializes it.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;

        // WAL returns the new mode as a row
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        let mut store = Self {
            conn,
            path: Some(path),
        };
        store.init()?;
        Ok(store)
    }

    /// Creates an initialized in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let mut store = Self { conn, path: None };
        store.init()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Creates the schema if needed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails or the database was
    /// written by a newer version.
    pub fn init(&mut self) -> Result<()> {
        if self.is_initialized()? {
            if let Some(version) = self.schema_version()?
                && version > CURRENT_SCHEMA_VERSION
            {
                return Err(StorageError::Migration(format!(
                    "database schema v{version} is newer than supported v{CURRENT_SCHEMA_VERSION}"
                ))
                .into());
            }
            return Ok(());
        }

        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(StorageError::from)?;
        self.conn
            .execute(
                SET_VERSION_SQL,
                params![CURRENT_SCHEMA_VERSION.to_string()],
            )
            .map_err(StorageError::from)?;
        tracing::debug!(version = CURRENT_SCHEMA_VERSION, "database schema created");
        Ok(())
    }

    /// Checks whether the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    pub fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    /// Gets the stored schema version.
    fn schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    /// Returns current Unix timestamp.
    #[allow(clippy::cast_possible_wrap)]
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(GET_VALUE_SQL, params![key], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(SET_VALUE_SQL, params![key, value, Self::now()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute(DELETE_VALUE_SQL, params![key])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(LIST_KEYS_SQL)
            .map_err(StorageError::from)?;
        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(StorageError::from)?;
        Ok(keys)
    }
}
