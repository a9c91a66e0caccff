//! Store handle for name records.
//!
//! `NameStore` owns the single SQLite connection used by the service. It is
//! constructed explicitly at startup, shared behind an `Arc` by the procedure
//! surface, and closed on shutdown. Every statement goes through
//! [`NameStore::with_conn`], which serializes access and logs the outcome.

use crate::core::db;
use crate::core::error::NameStoreError;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the store keeps its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// On-disk database file (WAL mode).
    File(PathBuf),
    /// Private in-memory database, gone when the handle is closed.
    Memory,
}

/// A stored name. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

const RECORD_COLUMNS: &str = "id, name, created_at";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<NameRecord> {
    Ok(NameRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn insert_row(conn: &Connection, name: &str) -> rusqlite::Result<NameRecord> {
    conn.query_row(
        &format!("INSERT INTO names(name, created_at) VALUES(?1, ?2) RETURNING {RECORD_COLUMNS}"),
        params![name, Utc::now()],
        row_to_record,
    )
}

pub struct NameStore {
    conn: Mutex<Connection>,
    location: StoreLocation,
}

impl NameStore {
    /// Open (creating if needed) the database at `path` and ensure the table exists.
    pub fn open(path: &Path) -> Result<Self, NameStoreError> {
        let conn = db::db_connect(path)?;
        db::initialize_names_db(&conn)?;
        log::info!("name store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            location: StoreLocation::File(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, NameStoreError> {
        let conn = db::db_connect_in_memory()?;
        db::initialize_names_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: StoreLocation::Memory,
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Execute a closure with the serialized connection.
    pub fn with_conn<F, R>(&self, op_name: &str, f: F) -> Result<R, NameStoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, NameStoreError>,
    {
        let mut conn = self.conn.lock().map_err(|_| {
            NameStoreError::StorageUnavailable("store connection lock poisoned".to_string())
        })?;

        let result = f(&mut *conn);

        match &result {
            Ok(_) => log::debug!("store op={} status=success", op_name),
            Err(e) => log::warn!("store op={} status=error err={}", op_name, e),
        }
        result
    }

    /// Append a record. Always creates a new row; names are not unique.
    pub fn insert(&self, name: &str) -> Result<NameRecord, NameStoreError> {
        self.with_conn("names.insert", |conn| Ok(insert_row(conn, name)?))
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<NameRecord>, NameStoreError> {
        self.with_conn("names.find_by_id", |conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM names WHERE id = ?1"),
                    params![id],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
    }

    /// All records with exactly this name (case-sensitive), oldest first.
    pub fn find_by_name(&self, name: &str) -> Result<Vec<NameRecord>, NameStoreError> {
        self.with_conn("names.find_by_name", |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM names WHERE name = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![name], row_to_record)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    /// Return the earliest record named `name`, inserting one if none exists.
    ///
    /// Lookup and insert share one immediate transaction while the connection
    /// lock is held, so two callers cannot both observe an empty result.
    /// Existing duplicates are left untouched.
    pub fn first_or_insert(&self, name: &str) -> Result<NameRecord, NameStoreError> {
        self.with_conn("names.first_or_insert", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let existing = tx
                .query_row(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM names WHERE name = ?1 ORDER BY id ASC LIMIT 1"
                    ),
                    params![name],
                    row_to_record,
                )
                .optional()?;
            let record = match existing {
                Some(record) => record,
                None => {
                    let record = insert_row(&tx, name)?;
                    log::info!("created record id={} name={:?}", record.id, record.name);
                    record
                }
            };
            tx.commit()?;
            Ok(record)
        })
    }

    pub fn count(&self) -> Result<i64, NameStoreError> {
        self.with_conn("names.count", |conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM names", [], |row| row.get(0))?)
        })
    }

    /// Close the underlying connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<(), NameStoreError> {
        let conn = self.conn.into_inner().map_err(|_| {
            NameStoreError::StorageUnavailable("store connection lock poisoned".to_string())
        })?;
        conn.close().map_err(|(_, e)| NameStoreError::RusqliteError(e))?;
        if let StoreLocation::File(path) = &self.location {
            log::info!("name store closed at {}", path.display());
        }
        Ok(())
    }
}
