use crate::core::error::NameStoreError;
use crate::core::store::{NameRecord, NameStore};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Name of the well-known singleton record.
pub const PEDRO: &str = "Pedro";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNameInput {
    pub name: String,
}

impl CreateNameInput {
    pub fn new(name: impl Into<String>) -> Result<Self, NameStoreError> {
        let input = Self { name: name.into() };
        input.validate()?;
        Ok(input)
    }

    /// Parse `{"name": string}` from RPC params. Unknown keys are ignored.
    pub fn from_params(params: &JsonValue) -> Result<Self, NameStoreError> {
        let obj = params.as_object().ok_or_else(|| {
            NameStoreError::ValidationError("params must be an object".to_string())
        })?;
        match obj.get("name") {
            Some(JsonValue::String(name)) => Self::new(name.as_str()),
            Some(_) => Err(NameStoreError::ValidationError(
                "name must be a string".to_string(),
            )),
            None => Err(NameStoreError::ValidationError("name is required".to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), NameStoreError> {
        if self.name.is_empty() {
            return Err(NameStoreError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetNameInput {
    pub id: i64,
}

impl GetNameInput {
    pub fn new(id: i64) -> Result<Self, NameStoreError> {
        let input = Self { id };
        input.validate()?;
        Ok(input)
    }

    /// Parse `{"id": positive integer}` from RPC params.
    ///
    /// Integral floats such as `3.0` are accepted; `3.5`, strings and
    /// non-positive numbers are rejected.
    pub fn from_params(params: &JsonValue) -> Result<Self, NameStoreError> {
        let obj = params.as_object().ok_or_else(|| {
            NameStoreError::ValidationError("params must be an object".to_string())
        })?;
        let raw = obj
            .get("id")
            .ok_or_else(|| NameStoreError::ValidationError("id is required".to_string()))?;
        let id = match raw {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(i)
                } else if n.is_u64() {
                    None
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f < i64::MAX as f64)
                        .map(|f| f as i64)
                }
            }
            _ => None,
        };
        match id {
            Some(id) => Self::new(id),
            None => Err(NameStoreError::ValidationError(
                "id must be a positive integer".to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), NameStoreError> {
        if self.id <= 0 {
            return Err(NameStoreError::ValidationError(
                "id must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Insert a new record unconditionally.
pub fn create_name(
    store: &NameStore,
    input: &CreateNameInput,
) -> Result<NameRecord, NameStoreError> {
    input.validate()?;
    store.insert(&input.name)
}

pub fn get_name(
    store: &NameStore,
    input: &GetNameInput,
) -> Result<Option<NameRecord>, NameStoreError> {
    input.validate()?;
    store.find_by_id(input.id)
}

/// Fetch the first "Pedro" record by insertion order, creating it when absent.
pub fn get_pedro_singleton(store: &NameStore) -> Result<NameRecord, NameStoreError> {
    store.first_or_insert(PEDRO)
}

#[derive(Parser, Debug)]
#[clap(name = "names", about = "Create and look up name records")]
pub struct NamesCli {
    #[clap(subcommand)]
    pub command: NamesCommand,
}

#[derive(Subcommand, Debug)]
pub enum NamesCommand {
    /// Insert a new name record.
    Create {
        #[clap(long)]
        name: String,
    },
    /// Look up a record by id.
    Get {
        #[clap(long)]
        id: i64,
    },
    /// Fetch (or create) the Pedro singleton.
    Pedro,
}

pub fn run_names_cli(store: &NameStore, cli: NamesCli) -> Result<(), NameStoreError> {
    let out = match cli.command {
        NamesCommand::Create { name } => {
            let input = CreateNameInput::new(name)?;
            serde_json::to_value(create_name(store, &input)?)
        }
        NamesCommand::Get { id } => {
            let input = GetNameInput::new(id)?;
            serde_json::to_value(get_name(store, &input)?)
        }
        NamesCommand::Pedro => serde_json::to_value(get_pedro_singleton(store)?),
    }?;
    println!(
        "{}",
        serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
    );
    Ok(())
}
