//! Atelier API Server Entry Point
//!
//! Bootstraps configuration, wires the oracle and record store into the
//! interpreter, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use atelier_api::{build_router, init_telemetry, ApiConfig, ApiError, ApiResult, AppState};
use atelier_llm::{build_oracle, OracleConfig};
use atelier_store::InMemoryStore;
use axum::Router;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_telemetry()?;

    let oracle_config = OracleConfig::from_env()?;
    oracle_config.validate()?;
    let oracle = build_oracle(&oracle_config);
    if !oracle.is_configured() {
        tracing::warn!(
            provider = oracle.provider_name(),
            "No oracle credential configured - commands will classify as unknown"
        );
    }

    // In-memory store. Production deployments swap in a database-backed
    // RecordStore implementation here.
    let store = Arc::new(InMemoryStore::new());

    let api_config = ApiConfig::from_env();
    let state = AppState::new(store, oracle, api_config.locale);
    let app: Router = build_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Atelier API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("cannot bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("server exited: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("ATELIER_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("ATELIER_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("unusable port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("unusable bind address {}: {}", addr, e)))
}
