//! HTTP transport for the RPC surface.
//!
//! `POST /rpc` takes a request envelope and always answers with a response
//! envelope; the HTTP status mirrors the envelope's error code.
//! `GET /healthcheck` is a shortcut for the `healthcheck` op.
//! Every route answers cross-origin requests from any origin.

use crate::core::config::ServiceConfig;
use crate::core::error::NameStoreError;
use crate::core::rpc::{self, HealthStatus, RpcResponse};
use crate::core::store::NameStore;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub type SharedStore = Arc<NameStore>;

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/rpc", post(rpc_handler))
        .route("/healthcheck", get(healthcheck_handler))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

pub fn status_for(response: &RpcResponse) -> StatusCode {
    match response.error.as_ref().map(|e| e.code.as_str()) {
        None => StatusCode::OK,
        Some(rpc::CODE_VALIDATION) | Some(rpc::CODE_INVALID_REQUEST) => StatusCode::BAD_REQUEST,
        Some(rpc::CODE_UNKNOWN_OP) => StatusCode::NOT_FOUND,
        Some(rpc::CODE_STORAGE) => StatusCode::SERVICE_UNAVAILABLE,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn rpc_handler(
    State(store): State<SharedStore>,
    body: Bytes,
) -> (StatusCode, Json<RpcResponse>) {
    let response = match tokio::task::spawn_blocking(move || rpc::dispatch_bytes(&store, &body))
        .await
    {
        Ok(response) => response,
        Err(e) => {
            log::error!("rpc worker failed: {}", e);
            rpc::error_response(
                rpc::default_request_id(),
                String::new(),
                &serde_json::Value::Null,
                rpc::CODE_INTERNAL,
                format!("worker failed: {}", e),
            )
        }
    };
    (status_for(&response), Json(response))
}

async fn healthcheck_handler() -> Json<HealthStatus> {
    Json(rpc::healthcheck())
}

pub async fn bind(config: &ServiceConfig) -> Result<TcpListener, NameStoreError> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| NameStoreError::ConfigError(format!("cannot bind {}: {}", addr, e)))
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve_until<S>(
    listener: TcpListener,
    store: SharedStore,
    shutdown: S,
) -> Result<(), NameStoreError>
where
    S: Future<Output = ()> + Send + 'static,
{
    log::info!("RPC server listening at {}", listener.local_addr()?);
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await?;
    log::info!("RPC server stopped");
    Ok(())
}

pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutdown requested");
}

/// Close the store once every clone held by the router is gone.
pub fn release_store(store: SharedStore) -> Result<(), NameStoreError> {
    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(_) => {
            log::warn!("store still shared at shutdown; dropping without explicit close");
            Ok(())
        }
    }
}
