//! namestore RPC interface
//!
//! Every procedure is addressed by an envelope `{op, params, id}` and answered
//! with a response envelope carrying a receipt, the result, or an error.
//! The same dispatcher serves the HTTP transport (`POST /rpc`) and the
//! one-shot `namestore rpc` command.
//!
//! # Standard Response Envelope
//!
//! - `receipt`: op, timestamp, and content hashes of params and result
//! - `result`: operation output (present on success, may be `null`)
//! - `error`: stable `code` plus message (present on failure)

use crate::core::error::NameStoreError;
use crate::core::store::NameStore;
use crate::plugins::names::{self, CreateNameInput, GetNameInput};
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt;
use std::str::FromStr;

pub const CODE_VALIDATION: &str = "validation_error";
pub const CODE_STORAGE: &str = "storage_unavailable";
pub const CODE_UNKNOWN_OP: &str = "unknown_op";
pub const CODE_INVALID_REQUEST: &str = "invalid_request";
pub const CODE_INTERNAL: &str = "internal_error";

/// Standard RPC request envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    /// Operation to perform
    pub op: String,
    /// Operation parameters
    #[serde(default)]
    pub params: serde_json::Value,
    /// Request ID for correlation
    #[serde(default = "default_request_id")]
    pub id: String,
}

pub fn default_request_id() -> String {
    crate::core::time::new_request_id()
}

impl RpcRequest {
    pub fn new(op: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            op: op.into(),
            params,
            id: default_request_id(),
        }
    }
}

/// Standard RPC response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcResponse {
    /// Request ID for correlation
    pub id: String,
    /// Whether the operation succeeded
    pub success: bool,
    /// Receipt of what happened
    pub receipt: Receipt,
    /// Result of the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error details (if success is false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// Receipt documenting what happened
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Receipt {
    pub op: String,
    /// Timestamp (ISO 8601)
    pub timestamp: String,
    /// Content hash of inputs
    pub inputs_hash: String,
    /// Content hash of outputs
    pub outputs_hash: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

/// Procedures exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Healthcheck,
    CreateName,
    GetName,
    GetPedroSingleton,
    Capabilities,
}

impl Op {
    pub const ALL: [Op; 5] = [
        Op::Healthcheck,
        Op::CreateName,
        Op::GetName,
        Op::GetPedroSingleton,
        Op::Capabilities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Healthcheck => "healthcheck",
            Op::CreateName => "createName",
            Op::GetName => "getName",
            Op::GetPedroSingleton => "getPedroSingleton",
            Op::Capabilities => "capabilities",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Op::Healthcheck => "Liveness check; never touches the store",
            Op::CreateName => "Insert a new name record",
            Op::GetName => "Fetch a record by id, or null",
            Op::GetPedroSingleton => "Fetch the first Pedro record, creating it if absent",
            Op::Capabilities => "Describe the supported operations",
        }
    }

    fn required_params(&self) -> Vec<String> {
        match self {
            Op::CreateName => vec!["name".to_string()],
            Op::GetName => vec!["id".to_string()],
            _ => vec![],
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthcheck" => Ok(Op::Healthcheck),
            "createName" => Ok(Op::CreateName),
            "getName" => Ok(Op::GetName),
            // `getPedro` is the historical route name.
            "getPedroSingleton" | "getPedro" => Ok(Op::GetPedroSingleton),
            "capabilities" => Ok(Op::Capabilities),
            other => Err(format!("unknown op '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

pub fn healthcheck() -> HealthStatus {
    HealthStatus {
        status: "ok".to_string(),
        timestamp: crate::core::time::now_rfc3339(),
    }
}

/// Capabilities report for client discovery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CapabilitiesReport {
    pub service: String,
    pub version: String,
    pub ops: Vec<OpInfo>,
    pub schemas: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpInfo {
    pub op: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required_params: Vec<String>,
}

pub fn generate_capabilities() -> CapabilitiesReport {
    CapabilitiesReport {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ops: Op::ALL
            .iter()
            .map(|op| OpInfo {
                op: op.as_str().to_string(),
                description: op.description().to_string(),
                required_params: op.required_params(),
            })
            .collect(),
        schemas: vec![crate::core::schemas::schema()],
    }
}

fn sha256_hex(data: &str) -> String {
    format!("{:x}", sha2::Sha256::digest(data))
}

/// Create a successful response
pub fn success_response(
    request_id: String,
    op: String,
    params: &serde_json::Value,
    result: serde_json::Value,
) -> RpcResponse {
    let inputs_hash = sha256_hex(&serde_json::to_string(params).unwrap_or_default());
    let outputs_hash = sha256_hex(&serde_json::to_string(&result).unwrap_or_default());

    RpcResponse {
        id: request_id,
        success: true,
        receipt: Receipt {
            op,
            timestamp: crate::core::time::now_rfc3339(),
            inputs_hash,
            outputs_hash,
        },
        result: Some(result),
        error: None,
    }
}

/// Create an error response
pub fn error_response(
    request_id: String,
    op: String,
    params: &serde_json::Value,
    code: &str,
    message: String,
) -> RpcResponse {
    let inputs_hash = sha256_hex(&serde_json::to_string(params).unwrap_or_default());
    let outputs_hash = sha256_hex("error");

    RpcResponse {
        id: request_id,
        success: false,
        receipt: Receipt {
            op,
            timestamp: crate::core::time::now_rfc3339(),
            inputs_hash,
            outputs_hash,
        },
        result: None,
        error: Some(RpcError {
            code: code.to_string(),
            message,
        }),
    }
}

fn execute(
    store: &NameStore,
    op: Op,
    params: &serde_json::Value,
) -> Result<serde_json::Value, NameStoreError> {
    let value = match op {
        Op::Healthcheck => serde_json::to_value(healthcheck())?,
        Op::Capabilities => serde_json::to_value(generate_capabilities())?,
        Op::CreateName => {
            let input = CreateNameInput::from_params(params)?;
            serde_json::to_value(names::create_name(store, &input)?)?
        }
        Op::GetName => {
            let input = GetNameInput::from_params(params)?;
            serde_json::to_value(names::get_name(store, &input)?)?
        }
        Op::GetPedroSingleton => serde_json::to_value(names::get_pedro_singleton(store)?)?,
    };
    Ok(value)
}

/// Route a request to its procedure and wrap the outcome in a response envelope.
pub fn dispatch(store: &NameStore, request: RpcRequest) -> RpcResponse {
    let RpcRequest { op, params, id } = request;

    let parsed = match op.parse::<Op>() {
        Ok(parsed) => parsed,
        Err(message) => {
            log::warn!("rpc id={} rejected: {}", id, message);
            return error_response(id, op, &params, CODE_UNKNOWN_OP, message);
        }
    };

    match execute(store, parsed, &params) {
        Ok(result) => {
            log::debug!("rpc id={} op={} ok", id, parsed);
            success_response(id, parsed.to_string(), &params, result)
        }
        Err(e) => {
            log::warn!("rpc id={} op={} failed: {}", id, parsed, e);
            error_response(id, parsed.to_string(), &params, e.code(), e.to_string())
        }
    }
}

/// Parse a raw JSON envelope and dispatch it. Malformed input yields an
/// `invalid_request` envelope rather than an error.
pub fn dispatch_raw(store: &NameStore, raw: &str) -> RpcResponse {
    dispatch_bytes(store, raw.as_bytes())
}

/// Same as [`dispatch_raw`] for bodies that may not be UTF-8.
pub fn dispatch_bytes(store: &NameStore, raw: &[u8]) -> RpcResponse {
    match serde_json::from_slice::<RpcRequest>(raw) {
        Ok(request) => dispatch(store, request),
        Err(e) => error_response(
            default_request_id(),
            String::new(),
            &serde_json::Value::Null,
            CODE_INVALID_REQUEST,
            format!("malformed request: {}", e),
        ),
    }
}
