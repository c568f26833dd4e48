//! Idempotency Middleware
//!
//! Provides idempotency key support for mutating requests. A retried
//! request carrying the same `Idempotency-Key` header returns the recorded
//! response instead of executing the command again.
//!
//! Clients include an `Idempotency-Key` header with a unique value
//! (typically a UUID) on POST requests. The server will:
//!
//! 1. Check the ledger for the key within the caller's organization
//! 2. If recorded with a matching request hash: replay the stored response
//!    with an `x-idempotency-replay: true` header
//! 3. If recorded with a different hash: return 409 Conflict
//! 4. If new: execute the request and record the response
//!
//! The ledger is in-process and scoped by the `organizationId` in the
//! request body. Entries expire after the configured TTL. Server error
//! responses are not recorded, so a retry after a 5xx executes again.
//! Without a key, retried requests execute at least once each.

use crate::error::{ApiError, ErrorCode};
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Header name for idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Header marking a replayed response
pub const IDEMPOTENCY_REPLAY_HEADER: &str = "x-idempotency-replay";

/// Default TTL for ledger entries (24 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum size of request body to buffer and hash (1MB)
pub const MAX_BODY_HASH_SIZE: usize = 1024 * 1024;

// ============================================================================
// STATE
// ============================================================================

/// Configuration for idempotency middleware.
#[derive(Debug, Clone)]
pub struct IdempotencyConfig {
    /// Time-to-live for ledger entries
    pub ttl: Duration,

    /// Maximum body size to consider for hashing
    pub max_body_size: usize,

    /// Whether to require idempotency keys on mutating requests
    pub require_key: bool,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_body_size: MAX_BODY_HASH_SIZE,
            require_key: false, // Optional by default
        }
    }
}

/// A recorded response for one (organization, key) pair.
#[derive(Debug, Clone)]
struct LedgerEntry {
    request_hash: Vec<u8>,
    status: u16,
    body: Bytes,
    stored_at: Instant,
}

/// Shared state for idempotency middleware.
#[derive(Clone, Default)]
pub struct IdempotencyState {
    ledger: Arc<DashMap<(Uuid, String), LedgerEntry>>,
    config: IdempotencyConfig,
}

impl IdempotencyState {
    /// Create new idempotency state with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create idempotency state with custom configuration.
    pub fn with_config(config: IdempotencyConfig) -> Self {
        Self {
            ledger: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Number of live ledger entries.
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Drop every entry older than the TTL.
    fn purge_expired(&self) {
        let ttl = self.config.ttl;
        self.ledger.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }
}

// ============================================================================
// MIDDLEWARE
// ============================================================================

/// Axum middleware for idempotency key handling.
///
/// GET and HEAD requests are passed through unchanged, as are mutating
/// requests without a key (unless `require_key` is set) and requests whose
/// body carries no parseable `organizationId` to scope the ledger by.
pub async fn idempotency_middleware(
    State(state): State<IdempotencyState>,
    request: Request,
    next: Next,
) -> Result<Response, IdempotencyError> {
    let method = request.method().clone();
    if !is_mutating_method(&method) {
        return Ok(next.run(request).await);
    }

    let idempotency_key = request
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let idempotency_key = match idempotency_key {
        Some(key) => {
            if key.is_empty() || key.len() > 256 {
                return Err(IdempotencyError::InvalidKey(
                    "Idempotency key must be 1-256 characters".to_string(),
                ));
            }
            key
        }
        None => {
            if state.config.require_key {
                return Err(IdempotencyError::MissingKey);
            }
            return Ok(next.run(request).await);
        }
    };

    // Buffer the request body for hashing and organization scoping.
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, state.config.max_body_size)
        .await
        .map_err(|e| IdempotencyError::Internal(format!("Failed to read request body: {}", e)))?;

    // The ledger is organization-scoped. A body without a parseable
    // organization id cannot be scoped and passes through; the handler
    // rejects it on its own terms.
    let Some(organization_id) = extract_organization_id(&body_bytes) else {
        let request = Request::from_parts(parts, Body::from(body_bytes));
        return Ok(next.run(request).await);
    };

    let request_hash = compute_request_hash(&method, parts.uri.path(), &body_bytes);
    let ledger_key = (organization_id, idempotency_key.clone());

    if let Some(entry) = state.ledger.get(&ledger_key) {
        if entry.stored_at.elapsed() < state.config.ttl {
            if entry.request_hash == request_hash {
                tracing::debug!(
                    idempotency_key = %idempotency_key,
                    %organization_id,
                    "replaying recorded response for idempotency key"
                );
                return replay_response(&entry);
            }
            return Err(IdempotencyError::Conflict(idempotency_key));
        }
        drop(entry);
        state.ledger.remove(&ledger_key);
    }

    // Execute the request.
    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    // Record the response so a retry can replay it. Server errors are not
    // recorded so a retry can succeed.
    let (resp_parts, resp_body) = response.into_parts();
    let resp_bytes = axum::body::to_bytes(resp_body, state.config.max_body_size)
        .await
        .unwrap_or_default();

    if !resp_parts.status.is_server_error() {
        state.purge_expired();
        state.ledger.insert(
            ledger_key,
            LedgerEntry {
                request_hash,
                status: resp_parts.status.as_u16(),
                body: resp_bytes.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    Ok(Response::from_parts(resp_parts, Body::from(resp_bytes)))
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if the HTTP method is a mutating operation.
fn is_mutating_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Pull the organization id out of a JSON request body.
fn extract_organization_id(body: &Bytes) -> Option<Uuid> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("organizationId")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Compute SHA-256 hash of method + path + body.
fn compute_request_hash(method: &Method, path: &str, body: &Bytes) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(method.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(path.as_bytes());
    hasher.update(b"|");
    hasher.update(body);
    hasher.finalize().to_vec()
}

/// Rebuild a response from a ledger entry.
fn replay_response(entry: &LedgerEntry) -> Result<Response, IdempotencyError> {
    let status = StatusCode::from_u16(entry.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header(IDEMPOTENCY_REPLAY_HEADER, "true")
        .body(Body::from(entry.body.clone()))
        .map_err(|e| IdempotencyError::Internal(format!("Failed to build response: {}", e)))
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Errors that can occur in idempotency middleware.
#[derive(Debug)]
pub enum IdempotencyError {
    /// Idempotency key is required but not provided
    MissingKey,

    /// Idempotency key format is invalid
    InvalidKey(String),

    /// Key exists but request hash doesn't match (different request)
    Conflict(String),

    /// Internal error (body buffering, response building)
    Internal(String),
}

impl IntoResponse for IdempotencyError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            IdempotencyError::MissingKey => (
                StatusCode::BAD_REQUEST,
                ApiError::new(
                    ErrorCode::MissingField,
                    format!("Header '{}' is required for this operation", IDEMPOTENCY_KEY_HEADER),
                ),
            ),
            IdempotencyError::InvalidKey(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new(ErrorCode::InvalidFormat, msg),
            ),
            IdempotencyError::Conflict(key) => (
                StatusCode::CONFLICT,
                ApiError::idempotency_conflict(&key),
            ),
            IdempotencyError::Internal(msg) => {
                tracing::error!(error = %msg, "idempotency middleware internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::from_code(ErrorCode::InternalError),
                )
            }
        };

        (status, axum::Json(error)).into_response()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[test]
    fn test_is_mutating_method() {
        assert!(is_mutating_method(&Method::POST));
        assert!(is_mutating_method(&Method::PUT));
        assert!(is_mutating_method(&Method::PATCH));
        assert!(is_mutating_method(&Method::DELETE));
        assert!(!is_mutating_method(&Method::GET));
        assert!(!is_mutating_method(&Method::HEAD));
        assert!(!is_mutating_method(&Method::OPTIONS));
    }

    #[test]
    fn test_compute_request_hash_deterministic() {
        let body = Bytes::from(r#"{"message": "test"}"#);
        let hash1 = compute_request_hash(&Method::POST, "/api/v1/command", &body);
        let hash2 = compute_request_hash(&Method::POST, "/api/v1/command", &body);
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_compute_request_hash_different_for_different_inputs() {
        let body = Bytes::from(r#"{"message": "test"}"#);

        let hash1 = compute_request_hash(&Method::POST, "/api/v1/command", &body);
        let hash2 = compute_request_hash(&Method::PUT, "/api/v1/command", &body);
        assert_ne!(hash1, hash2);

        let other_body = Bytes::from(r#"{"message": "other"}"#);
        let hash3 = compute_request_hash(&Method::POST, "/api/v1/command", &other_body);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_extract_organization_id() {
        let org = Uuid::now_v7();
        let body = Bytes::from(format!(r#"{{"message": "hi", "organizationId": "{}"}}"#, org));
        assert_eq!(extract_organization_id(&body), Some(org));

        assert_eq!(extract_organization_id(&Bytes::from("not json")), None);
        assert_eq!(
            extract_organization_id(&Bytes::from(r#"{"organizationId": "garbage"}"#)),
            None
        );
    }

    #[test]
    fn test_idempotency_config_default() {
        let config = IdempotencyConfig::default();
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.max_body_size, MAX_BODY_HASH_SIZE);
        assert!(!config.require_key);
    }

    fn counting_app(state: IdempotencyState, hits: Arc<AtomicUsize>) -> Router {
        let handler = move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(serde_json::json!({"success": true}))
            }
        };
        Router::new()
            .route("/api/v1/command", post(handler))
            .layer(middleware::from_fn_with_state(state, idempotency_middleware))
    }

    fn command_request(org: Uuid, message: &str, key: Option<&str>) -> Request {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/command")
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }
        // Fixed user id: a retried request must reproduce the same body bytes.
        builder
            .body(Body::from(format!(
                r#"{{"message": "{}", "organizationId": "{}", "userId": "{}"}}"#,
                message,
                org,
                Uuid::from_u128(7)
            )))
            .expect("request should build")
    }

    #[tokio::test]
    async fn test_retry_with_same_key_replays_without_reexecuting() {
        let state = IdempotencyState::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let org = Uuid::now_v7();

        let first = counting_app(state.clone(), hits.clone())
            .oneshot(command_request(org, "log 2 hours", Some("key-1")))
            .await
            .expect("first request should succeed");
        assert_eq!(first.status(), StatusCode::OK);
        assert!(first.headers().get(IDEMPOTENCY_REPLAY_HEADER).is_none());

        let second = counting_app(state, hits.clone())
            .oneshot(command_request(org, "log 2 hours", Some("key-1")))
            .await
            .expect("second request should succeed");
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(
            second
                .headers()
                .get(IDEMPOTENCY_REPLAY_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_key_different_body_conflicts() {
        let state = IdempotencyState::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let org = Uuid::now_v7();

        counting_app(state.clone(), hits.clone())
            .oneshot(command_request(org, "log 2 hours", Some("key-1")))
            .await
            .expect("first request should succeed");

        let conflicting = counting_app(state, hits.clone())
            .oneshot(command_request(org, "log 9 hours", Some("key-1")))
            .await
            .expect("conflicting request should get a response");

        assert_eq!(conflicting.status(), StatusCode::CONFLICT);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_key_different_org_executes_separately() {
        let state = IdempotencyState::new();
        let hits = Arc::new(AtomicUsize::new(0));

        counting_app(state.clone(), hits.clone())
            .oneshot(command_request(Uuid::now_v7(), "log 2 hours", Some("key-1")))
            .await
            .expect("first org request should succeed");
        counting_app(state, hits.clone())
            .oneshot(command_request(Uuid::now_v7(), "log 2 hours", Some("key-1")))
            .await
            .expect("second org request should succeed");

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_without_key_every_attempt_executes() {
        let state = IdempotencyState::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let org = Uuid::now_v7();

        for _ in 0..2 {
            counting_app(state.clone(), hits.clone())
                .oneshot(command_request(org, "log 2 hours", None))
                .await
                .expect("request should succeed");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_executes_again() {
        let state = IdempotencyState::with_config(IdempotencyConfig {
            ttl: Duration::from_millis(10),
            ..IdempotencyConfig::default()
        });
        let hits = Arc::new(AtomicUsize::new(0));
        let org = Uuid::now_v7();

        counting_app(state.clone(), hits.clone())
            .oneshot(command_request(org, "log 2 hours", Some("key-1")))
            .await
            .expect("first request should succeed");

        tokio::time::sleep(Duration::from_millis(25)).await;

        let retry = counting_app(state, hits.clone())
            .oneshot(command_request(org, "log 2 hours", Some("key-1")))
            .await
            .expect("retry should succeed");

        assert!(retry.headers().get(IDEMPOTENCY_REPLAY_HEADER).is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_oversized_key_rejected() {
        let state = IdempotencyState::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let long_key = "k".repeat(300);

        let response = counting_app(state, hits.clone())
            .oneshot(command_request(Uuid::now_v7(), "hi", Some(&long_key)))
            .await
            .expect("request should get a response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
