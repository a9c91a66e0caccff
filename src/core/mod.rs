//! Core modules: storage, RPC envelope, transport and configuration.

pub mod config;
pub mod db;
pub mod error;
pub mod rpc;
pub mod schemas;
pub mod server;
pub mod store;
pub mod time;
