//! HTTP error surface.
//!
//! Every failure leaves the API as the same JSON shape: a stable
//! machine-readable code, a human-readable message, and optional structured
//! details. Interpreter errors convert via `From`, so handlers bubble them
//! with `?`.

use atelier_core::{AtelierError, OracleError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODES
// ============================================================================

/// Machine-readable error codes, serialized in SCREAMING_SNAKE_CASE.
/// Clients switch on these rather than on the HTTP status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A request value is unusable: blank text, nil identifier.
    InvalidInput,
    /// A required field is absent.
    MissingField,
    /// A field is present but malformed.
    InvalidFormat,
    /// An idempotency key was replayed with a different request body.
    IdempotencyConflict,
    /// The classification oracle could not be reached or rejected the call.
    OracleUnavailable,
    /// A dependency of the service, in practice the record store, is down.
    ServiceUnavailable,
    /// Unexpected failure inside the service itself.
    InternalError,
}

impl ErrorCode {
    /// HTTP status this code travels with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::MissingField | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::IdempotencyConflict => StatusCode::CONFLICT,
            ErrorCode::OracleUnavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fallback message when the caller has nothing more specific to say.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "request data is invalid",
            ErrorCode::MissingField => "a required field is missing",
            ErrorCode::InvalidFormat => "a field value is malformed",
            ErrorCode::IdempotencyConflict => "idempotency key reused with a different request",
            ErrorCode::OracleUnavailable => "command classification is unavailable",
            ErrorCode::ServiceUnavailable => "a backing service is unavailable",
            ErrorCode::InternalError => "internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR
// ============================================================================

/// The one error body every endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Extra context such as the failing field or the upstream status.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// An error carrying only the code's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // Shorthand for the codes handlers actually raise.

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("required field '{}' is missing", field),
        )
    }

    pub fn idempotency_conflict(key: &str) -> Self {
        Self::new(
            ErrorCode::IdempotencyConflict,
            format!("idempotency key '{}' was already used with a different request", key),
        )
    }

    pub fn oracle_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OracleUnavailable, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Lets handlers return `ApiError` directly; the body is the error itself.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Interpreter errors that escape a handler.
///
/// The pipeline absorbs soft failures into `unknown` outcomes, so in
/// practice only hard oracle failures arrive here. The other arms still
/// map cleanly and log the cause server-side.
impl From<AtelierError> for ApiError {
    fn from(err: AtelierError) -> Self {
        match err {
            AtelierError::Oracle(oracle_err) => {
                tracing::error!(error = %oracle_err, "oracle failure surfaced to the API");
                let api_err = ApiError::from_code(ErrorCode::OracleUnavailable);
                match oracle_err {
                    OracleError::RequestFailed { provider, status, .. } => api_err
                        .with_details(serde_json::json!({
                            "provider": provider,
                            "upstream_status": status,
                        })),
                    OracleError::Transport { provider, .. } => {
                        api_err.with_details(serde_json::json!({ "provider": provider }))
                    }
                    _ => api_err,
                }
            }
            AtelierError::Store(store_err) => {
                tracing::error!(error = %store_err, "store failure surfaced to the API");
                ApiError::service_unavailable("record store unavailable")
            }
            AtelierError::Validation(validation_err) => {
                ApiError::invalid_input(validation_err.to_string())
            }
            AtelierError::Config(config_err) => {
                tracing::error!(error = %config_err, "configuration error");
                ApiError::internal_error("service misconfigured")
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("invalid JSON: {}", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
