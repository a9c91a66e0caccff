use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT_SECS: u64 = 5;

pub fn db_connect(db_path: &Path) -> Result<Connection, error::NameStoreError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(error::NameStoreError::IoError)?;
    }
    let conn = Connection::open(db_path).map_err(|e| {
        error::NameStoreError::StorageUnavailable(format!(
            "cannot open {}: {}",
            db_path.display(),
            e
        ))
    })?;
    conn.busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    Ok(conn)
}

pub fn db_connect_in_memory() -> Result<Connection, error::NameStoreError> {
    let conn = Connection::open_in_memory()?;
    Ok(conn)
}

pub fn initialize_names_db(conn: &Connection) -> Result<(), error::NameStoreError> {
    conn.execute(schemas::NAMES_DB_SCHEMA, [])?;
    conn.execute(schemas::NAMES_DB_INDEX_NAME, [])?;
    Ok(())
}
