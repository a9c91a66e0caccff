use crate::core::rpc::{CODE_INTERNAL, CODE_STORAGE, CODE_VALIDATION};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NameStoreError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl NameStoreError {
    /// Stable error code reported in RPC envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            NameStoreError::ValidationError(_) => CODE_VALIDATION,
            NameStoreError::RusqliteError(_) | NameStoreError::StorageUnavailable(_) => {
                CODE_STORAGE
            }
            NameStoreError::JsonError(_)
            | NameStoreError::IoError(_)
            | NameStoreError::ConfigError(_) => CODE_INTERNAL,
        }
    }

    pub fn is_storage(&self) -> bool {
        self.code() == CODE_STORAGE
    }
}
