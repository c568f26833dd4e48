//! Probe endpoints for orchestrators.
//!
//! `/health/ping` and `/health/live` are constant-cost process checks.
//! `/health/ready` inspects the record store and the oracle configuration
//! and is the probe that should gate traffic.
//!
//! Readiness never calls the classification oracle; it only reports whether
//! a credential is configured. An unconfigured oracle degrades commands to
//! `unknown` rather than failing them, so it lowers readiness to `degraded`
//! without taking the service out of rotation.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use atelier_llm::CommandOracle;
use atelier_store::RecordStore;

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Body shared by the liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthDetails {
    pub store: ComponentHealth,
    pub oracle: OracleHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Oracle health is configuration-only; no request is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OracleHealth {
    pub status: HealthStatus,
    pub provider: String,
    pub configured: bool,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Constant-cost probe for load balancers.
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service answers", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// Process-level liveness; says nothing about dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse),
    ),
)]
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("process up".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// Full readiness: store connectivity plus oracle configuration.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready (possibly degraded)", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse),
    ),
)]
pub async fn readiness(
    State(store): State<Arc<dyn RecordStore>>,
    State(oracle): State<Arc<dyn CommandOracle>>,
    State(start_time): State<Instant>,
) -> impl IntoResponse {
    let store_health = match check_store(store.as_ref()).await {
        Ok(latency) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(e),
        },
    };

    let oracle_health = OracleHealth {
        status: if oracle.is_configured() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        provider: oracle.provider_name().to_string(),
        configured: oracle.is_configured(),
    };

    // The store is load-bearing; the oracle is not. Without a store no
    // command can be executed, without an oracle every command degrades
    // to `unknown` but the service still answers.
    let overall_status = if store_health.status != HealthStatus::Healthy {
        HealthStatus::Unhealthy
    } else if oracle_health.status == HealthStatus::Degraded {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let response = HealthResponse {
        status: overall_status,
        message: None,
        details: Some(HealthDetails {
            store: store_health,
            oracle: oracle_health,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if overall_status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

async fn check_store(store: &dyn RecordStore) -> Result<u64, String> {
    let start = Instant::now();

    match store.ping().await {
        Ok(()) => Ok(start.elapsed().as_millis() as u64),
        Err(e) => Err(format!("store ping failed: {}", e)),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Probe routes stay unauthenticated so orchestrators can reach them.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::Locale;
    use atelier_llm::{OracleKind, ScriptedOracle, UnconfiguredOracle};
    use atelier_store::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_status_serializes_lowercase() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            message: None,
            details: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        // Empty optionals stay off the wire.
        assert!(!json.contains("message"));
    }

    #[test]
    fn test_component_error_rides_along() {
        let component = ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some("store refused the connection".to_string()),
        };

        let json = serde_json::to_string(&component).unwrap();
        assert!(json.contains("\"status\":\"unhealthy\""));
        assert!(json.contains("store refused the connection"));
    }

    fn health_app(store: Arc<InMemoryStore>, oracle: Arc<dyn CommandOracle>) -> Router {
        let state = AppState::new(store, oracle, Locale::En);
        Router::new().nest("/health", create_router(state))
    }

    async fn get_ready(app: Router) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should get a response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should buffer");
        let json = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, json)
    }

    #[tokio::test]
    async fn test_readiness_healthy_with_store_and_oracle() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = Arc::new(ScriptedOracle::with_reply("{}"));

        let (status, body) = get_ready(health_app(store, oracle)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["details"]["oracle"]["configured"], true);
        assert_eq!(body["details"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readiness_degraded_without_oracle_credential() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = Arc::new(UnconfiguredOracle::new(OracleKind::Anthropic));

        let (status, body) = get_ready(health_app(store, oracle)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["details"]["oracle"]["configured"], false);
        assert_eq!(body["details"]["store"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_unhealthy_when_store_is_down() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_reads(true);
        let oracle = Arc::new(ScriptedOracle::with_reply("{}"));

        let (status, body) = get_ready(health_app(store, oracle)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["details"]["store"]["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_ping_returns_pong() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = Arc::new(ScriptedOracle::with_reply("{}"));

        let response = health_app(store, oracle)
            .oneshot(
                Request::builder()
                    .uri("/health/ping")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should get a response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should buffer");
        assert_eq!(&bytes[..], b"pong");
    }
}
