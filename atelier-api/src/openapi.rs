//! OpenAPI document assembly.
//!
//! utoipa derives the document from route annotations and the `ToSchema`
//! derives on core types; this module only lists what goes in. Served at
//! `/openapi.json` and browsable through Swagger UI when that feature is on.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{
    ComponentHealth, HealthDetails, HealthResponse, HealthStatus, OracleHealth,
};
use crate::routes::{command, health};

use atelier_core::{
    ActionKind, Client, ClientRef, CommandRecord, CommandRequest, CommandResponse, Lead,
    LeadStatus, Meeting, Project, ProjectRef, ProjectStatus, Task, TaskPriority, TaskStatus,
    TimeEntry,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "0.2.0",
        description = "Natural-language command interface for the Atelier studio management platform",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Atelier", url = "https://atelierhq.app")
    ),
    servers(
        (url = "https://api.atelierhq.app", description = "Production"),
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Commands", description = "Natural-language command interpretation"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        command::interpret_command,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            ApiError, ErrorCode,
            CommandRequest, CommandResponse, CommandRecord, ActionKind,
            Task, TaskPriority, TaskStatus,
            Lead, LeadStatus,
            TimeEntry, Meeting,
            Project, ProjectStatus, ProjectRef,
            Client, ClientRef,
            HealthResponse, HealthStatus, HealthDetails, ComponentHealth, OracleHealth,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The document as pretty-printed JSON, as served at `/openapi.json`.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
