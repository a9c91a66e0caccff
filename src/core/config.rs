//! Service configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! environment variables (`SERVER_PORT`, `NAMESTORE_DB`), then CLI flags.
//! The binary loads a `.env` file from the working directory into the process
//! environment before resolving, without overriding variables already set.

use crate::core::error::NameStoreError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 2022;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const PORT_ENV: &str = "SERVER_PORT";
pub const DB_ENV: &str = "NAMESTORE_DB";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(schemas::NAMES_DB_NAME),
        }
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, NameStoreError> {
        toml::from_str(content).map_err(|e| NameStoreError::ConfigError(e.to_string()))
    }

    pub fn load_file(path: &Path) -> Result<Self, NameStoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            NameStoreError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides read through `lookup`. Empty values count as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), NameStoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(PORT_ENV) {
            self.port = raw.trim().parse().map_err(|_| {
                NameStoreError::ConfigError(format!("{} is not a valid port: {:?}", PORT_ENV, raw))
            })?;
        }
        if let Some(raw) = get(DB_ENV) {
            self.db_path = PathBuf::from(raw);
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, overrides: &CliOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(db) = &overrides.db {
            self.db_path = db.clone();
        }
    }

    pub fn resolve_with<F>(overrides: &CliOverrides, lookup: F) -> Result<Self, NameStoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &overrides.config {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(lookup)?;
        config.apply_cli(overrides);
        Ok(config)
    }

    pub fn resolve(overrides: &CliOverrides) -> Result<Self, NameStoreError> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
