//! Storage layer for caption-rs.
//!
//! Settings and chat history live in a small key-value store. The default
//! backend is a `SQLite` file; [`MemoryStore`] serves tests and one-off runs.

pub mod history;
pub mod memory;
pub mod schema;
pub mod settings;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use settings::{API_MODE_KEY, HISTORY_KEY, LAST_MODEL_KEY, StateStore, config_key};
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;

use std::path::PathBuf;

/// Default database file name.
pub const DEFAULT_DB_NAME: &str = "caption-state.db";

/// Database path used when no data directory is known.
pub const FALLBACK_DB_PATH: &str = ".caption/caption-state.db";

/// Returns the default database path.
///
/// `<data dir>/caption-rs/caption-state.db`, or [`FALLBACK_DB_PATH`]
/// relative to the working directory.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(FALLBACK_DB_PATH),
        |dir| dir.join("caption-rs").join(DEFAULT_DB_NAME),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(path.ends_with(DEFAULT_DB_NAME));
    }
}
