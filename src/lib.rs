//! namestore: a small name-storage service
//!
//! Stores name records `{id, name, created_at}` in SQLite and exposes them
//! through a JSON RPC envelope, over HTTP (`namestore serve`) or one request
//! at a time (`namestore rpc`).
//!
//! # Operations
//!
//! - `healthcheck`: liveness, `{status: "ok", timestamp}`
//! - `createName`: insert a record for a non-empty name
//! - `getName`: fetch a record by positive id, or `null`
//! - `getPedroSingleton`: fetch the first "Pedro" record, creating it if absent
//! - `capabilities`: describe the supported ops
//!
//! # Examples
//!
//! ```bash
//! # Serve on $SERVER_PORT (default 2022)
//! namestore --db ./names.db serve
//!
//! # One-shot request against the same database
//! namestore rpc --op createName --params '{"name":"Alice"}'
//!
//! # Direct commands
//! namestore names pedro
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: store handle, schema, RPC envelope, HTTP server, configuration
//! - [`plugins`]: procedure implementations and input validation

pub mod core;
pub mod plugins;

use crate::core::{
    config::{CliOverrides, ServiceConfig},
    error, rpc, server,
    store::NameStore,
};
use crate::plugins::names;

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(
    name = "namestore",
    version = env!("CARGO_PKG_VERSION"),
    about = "Name storage service with a JSON RPC surface"
)]
struct Cli {
    /// TOML config file (host, port, db_path).
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database path (overrides NAMESTORE_DB and the config file).
    #[clap(long, global = true)]
    db: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ServeCli {
    /// Address to bind.
    #[clap(long)]
    host: Option<String>,
    /// Port to listen on (overrides SERVER_PORT).
    #[clap(long)]
    port: Option<u16>,
}

#[derive(clap::Args, Debug)]
struct RpcCli {
    /// Operation to perform
    #[clap(long)]
    op: Option<String>,
    /// JSON parameters
    #[clap(long)]
    params: Option<String>,
    /// Read request from stdin instead of command line
    #[clap(long)]
    stdin: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the RPC surface over HTTP
    #[clap(name = "serve")]
    Serve(ServeCli),

    /// Dispatch a single RPC envelope and print the response
    #[clap(name = "rpc")]
    Rpc(RpcCli),

    /// Create and look up name records directly
    #[clap(name = "names", visible_alias = "n")]
    Names(names::NamesCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}

pub fn run() -> Result<(), error::NameStoreError> {
    let cli = Cli::parse();
    let mut overrides = CliOverrides {
        config: cli.config,
        db: cli.db,
        ..Default::default()
    };

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Serve(serve) => {
            overrides.host = serve.host;
            overrides.port = serve.port;
            let config = ServiceConfig::resolve(&overrides)?;
            run_server(config)
        }
        Command::Rpc(rpc_cli) => {
            let config = ServiceConfig::resolve(&overrides)?;
            let store = NameStore::open(&config.db_path)?;
            let response = run_rpc_cli(&store, rpc_cli)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            store.close()
        }
        Command::Names(names_cli) => {
            let config = ServiceConfig::resolve(&overrides)?;
            let store = NameStore::open(&config.db_path)?;
            names::run_names_cli(&store, names_cli)?;
            store.close()
        }
    }
}

fn run_server(config: ServiceConfig) -> Result<(), error::NameStoreError> {
    log::info!(
        "starting namestore v{} (db={}, addr={})",
        env!("CARGO_PKG_VERSION"),
        config.db_path.display(),
        config.bind_addr()
    );
    let store = Arc::new(NameStore::open(&config.db_path)?);

    let rt = tokio::runtime::Runtime::new()?;
    let served = rt.block_on(async {
        let listener = server::bind(&config).await?;
        server::serve_until(listener, store.clone(), server::ctrl_c()).await
    });
    drop(rt);

    let released = server::release_store(store);
    served.and(released)
}

fn run_rpc_cli(store: &NameStore, cli: RpcCli) -> Result<rpc::RpcResponse, error::NameStoreError> {
    if cli.stdin {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(rpc::dispatch_raw(store, &raw));
    }

    let op = cli.op.ok_or_else(|| {
        error::NameStoreError::ValidationError("--op is required unless --stdin is set".to_string())
    })?;
    let params = match cli.params.as_deref() {
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            error::NameStoreError::ValidationError(format!("--params is not valid JSON: {}", e))
        })?,
        None => serde_json::json!({}),
    };
    Ok(rpc::dispatch(store, rpc::RpcRequest::new(op, params)))
}
