//! Database schema definitions for the name store.
//!
//! A single SQLite database holds one append-only table. Ids come from
//! `AUTOINCREMENT` so they are never reused, and insertion order is id order.

pub const NAMES_DB_NAME: &str = "names.db";

pub const NAMES_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS names (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    )
";

pub const NAMES_DB_INDEX_NAME: &str = "CREATE INDEX IF NOT EXISTS idx_names_name ON names(name)";

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "names",
        "version": "0.1.0",
        "description": "Append-only name records",
        "columns": [
            { "name": "id", "type": "INTEGER", "note": "store-assigned primary key" },
            { "name": "name", "type": "TEXT", "note": "required, not unique" },
            { "name": "created_at", "type": "TEXT", "note": "assigned at insert" }
        ],
        "storage": [NAMES_DB_NAME]
    })
}
