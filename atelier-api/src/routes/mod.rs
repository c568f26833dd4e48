//! REST API Routes
//!
//! Router assembly for the Atelier API:
//! - /api/v1/command - Natural-language command interpretation
//! - /health/* - Liveness and readiness probes
//! - /openapi.json - machine-readable API document
//!
//! The idempotency layer wraps only /api/v1/*; health and spec endpoints
//! stay outside it.

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{
    config::ApiConfig,
    middleware::{idempotency_middleware, IdempotencyConfig, IdempotencyState},
    openapi::ApiDoc,
    state::AppState,
};

pub mod command;
pub mod health;

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Build the complete application router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS (outermost) - handles preflight requests
/// 2. Tracing - one span per request
/// 3. Idempotency (only on /api/v1/*) - replays recorded responses
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let idempotency = IdempotencyState::with_config(IdempotencyConfig {
        ttl: config.idempotency_ttl(),
        ..IdempotencyConfig::default()
    });

    let api_routes = command::create_router(state.clone())
        .layer(from_fn_with_state(idempotency, idempotency_middleware));

    let router = Router::new()
        .nest("/api/v1", api_routes)
        // Health checks (no idempotency, no auth)
        .nest("/health", health::create_router(state))
        // OpenAPI spec
        .route("/openapi.json", get(openapi_json));

    let cors = build_cors_layer(config);

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("idempotency-key"),
        ])
        .expose_headers([HeaderName::from_static("x-idempotency-replay")])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        // Development mode: allow all origins
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any).expose_headers(Any)
    } else {
        // Production mode: only allow configured origins
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

// ============================================================================
// TESTS
// ============================================================================
