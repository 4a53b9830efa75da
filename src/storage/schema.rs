//! Database schema definitions for the SQLite document store.

/// SQL schema for the initial document table.
pub const SCHEMA: &str = r#"
-- One row per JSON document
CREATE TABLE IF NOT EXISTS documents (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Schema version tracking table
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for migration from v1 to v2 (write timestamps)
pub const MIGRATION_V1_TO_V2: &str = r#"
ALTER TABLE documents ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
"#;
