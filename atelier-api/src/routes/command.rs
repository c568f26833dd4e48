//! Command REST API Route
//!
//! Single endpoint accepting a natural-language message and running it
//! through the interpreter pipeline. The handler stays thin: field presence
//! is checked here, everything else (classification, validation, dispatch,
//! response composition) happens in `atelier-interpreter`.

use axum::{extract::State, routing::post, Json, Router};

use atelier_core::{CommandRequest, CommandResponse};
use atelier_interpreter::CommandInterpreter;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation::ValidateRequest,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/command - Interpret a natural-language command
///
/// Always returns 200 with a `CommandResponse` when the pipeline ran, even
/// when the command itself failed (`success: false`). Request-level errors
/// (missing fields, unreachable oracle) surface as 4xx/5xx instead.
#[utoipa::path(
    post,
    path = "/api/v1/command",
    tag = "Commands",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command interpreted; success field reports the outcome", body = CommandResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 502, description = "Classification oracle unreachable", body = ApiError),
        (status = 503, description = "Record store unavailable", body = ApiError),
    )
)]
pub async fn interpret_command(
    State(interpreter): State<CommandInterpreter>,
    Json(request): Json<CommandRequest>,
) -> ApiResult<Json<CommandResponse>> {
    request.validate()?;

    let response = interpreter.interpret(&request).await?;
    Ok(Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the command router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/command", post(interpret_command))
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================
