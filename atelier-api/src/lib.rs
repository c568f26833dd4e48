//! Atelier API - REST API Layer
//!
//! This crate provides the HTTP surface for the Atelier natural-language
//! command interpreter. It exposes a single command endpoint (Axum) plus
//! health probes and a served OpenAPI document.
//!
//! The API layer stays thin: request field presence and idempotency are
//! handled here, everything else runs through `atelier-interpreter`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{IdempotencyConfig, IdempotencyState, IDEMPOTENCY_KEY_HEADER};
pub use openapi::ApiDoc;
pub use routes::build_router;
pub use state::AppState;
pub use telemetry::init_telemetry;
