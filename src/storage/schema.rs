//! Database schema definitions.
//!
//! Contains the SQL schema and version bookkeeping for the caption-rs
//! `SQLite` database.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL schema for initial database setup.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Settings and history, one JSON or plain-text value per key
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// SQL to read one value.
pub const GET_VALUE_SQL: &str = r"
SELECT value FROM kv WHERE key = ?;
";

/// SQL to write one value.
pub const SET_VALUE_SQL: &str = r"
INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, ?);
";

/// SQL to delete one value.
pub const DELETE_VALUE_SQL: &str = r"
DELETE FROM kv WHERE key = ?;
";

/// SQL to list keys.
pub const LIST_KEYS_SQL: &str = r"
SELECT key FROM kv ORDER BY key;
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        const _: () = assert!(CURRENT_SCHEMA_VERSION >= 1);
    }

    #[test]
    fn test_schema_creates_tables() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS schema_info"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS kv"));
    }
}
