//! Atelier Core - Shared Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types and error definitions - no business
//! logic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Upper bound on reference entities (projects, clients) loaded per
/// organization before classification. Keeps the oracle instruction bounded
/// for large tenants.
pub const MAX_CONTEXT_ENTRIES: usize = 20;

// ============================================================================
// ENUMS
// ============================================================================

/// The closed set of actions the command interpreter can produce.
///
/// Any action name outside this set collapses to `Unknown` at
/// deserialization time, so downstream stages never see an out-of-set value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateTask,
    CreateLead,
    AddTime,
    CreateMeeting,
    UpdateProjectStatus,
    /// Could not be mapped to a supported action.
    #[serde(other)]
    Unknown,
}

impl ActionKind {
    /// Wire name of the action (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateTask => "create_task",
            ActionKind::CreateLead => "create_lead",
            ActionKind::AddTime => "add_time",
            ActionKind::CreateMeeting => "create_meeting",
            ActionKind::UpdateProjectStatus => "update_project_status",
            ActionKind::Unknown => "unknown",
        }
    }

    /// All executable actions, in instruction order. Excludes `Unknown`.
    pub fn executable() -> [ActionKind; 5] {
        [
            ActionKind::CreateTask,
            ActionKind::CreateLead,
            ActionKind::AddTime,
            ActionKind::CreateMeeting,
            ActionKind::UpdateProjectStatus,
        ]
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Status of a task. New tasks always start as `Todo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

/// Status of a sales lead. New leads always start as `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

/// UI languages the studio app ships with. Selects the catalog used for
/// user-facing interpreter messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    He,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::He => "he",
        }
    }

    /// Parse a language tag like "en" or "he". Unrecognized tags yield None.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "he" => Some(Locale::He),
            _ => None,
        }
    }
}

/// Record type discriminator, used in store errors and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Task,
    Lead,
    TimeEntry,
    Meeting,
    Project,
    Client,
}

// ============================================================================
// COMMAND PIPELINE TYPES
// ============================================================================

/// Inbound command request. Lives for a single interpreter invocation.
///
/// `organization_id` and `user_id` come from the caller's resolved session,
/// never from the message text, and are threaded through every store write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Raw natural-language text, e.g. "add a task to call the printer tomorrow".
    pub message: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub user_id: EntityId,
}

/// Lightweight project reference used for name-to-id resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProjectRef {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub id: EntityId,
    pub name: String,
}

/// Lightweight client reference used for name-to-id resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClientRef {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub id: EntityId,
    pub name: String,
}

/// Bounded snapshot of an organization's active records, loaded fresh per
/// request and inlined into the classification instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReferenceContext {
    /// Active projects, capped at [`MAX_CONTEXT_ENTRIES`].
    pub projects: Vec<ProjectRef>,
    /// Active clients, capped at [`MAX_CONTEXT_ENTRIES`].
    pub clients: Vec<ClientRef>,
}

impl ReferenceContext {
    /// Empty context, used when loading degrades or in tests.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.clients.is_empty()
    }
}

/// Untrusted classifier output: an action, a loose field bag, and a short
/// restatement of what the system understood.
///
/// `data` never crosses the validator; every executable path converts it to
/// a [`ValidatedCommand`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub action: ActionKind,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub summary: String,
}

impl ParsedCommand {
    /// The degraded form every unclassifiable input collapses to.
    pub fn unknown(summary: impl Into<String>) -> Self {
        Self {
            action: ActionKind::Unknown,
            data: serde_json::Map::new(),
            summary: summary.into(),
        }
    }
}

/// Typed command, one variant per executable action. Construction implies
/// every required field was present and well-formed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedCommand {
    CreateTask(CreateTask),
    CreateLead(CreateLead),
    AddTime(AddTime),
    CreateMeeting(CreateMeeting),
    UpdateProjectStatus(UpdateProjectStatus),
}

impl ValidatedCommand {
    pub fn action(&self) -> ActionKind {
        match self {
            ValidatedCommand::CreateTask(_) => ActionKind::CreateTask,
            ValidatedCommand::CreateLead(_) => ActionKind::CreateLead,
            ValidatedCommand::AddTime(_) => ActionKind::AddTime,
            ValidatedCommand::CreateMeeting(_) => ActionKind::CreateMeeting,
            ValidatedCommand::UpdateProjectStatus(_) => ActionKind::UpdateProjectStatus,
        }
    }
}

/// Fields for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTask {
    pub title: String,
    pub project_id: Option<EntityId>,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// Fields for creating a sales lead.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLead {
    pub name: String,
    pub company: Option<String>,
    pub budget: Option<f64>,
    pub description: Option<String>,
}

/// Fields for logging a time entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTime {
    pub hours: f64,
    pub description: Option<String>,
    pub project_id: Option<EntityId>,
    /// Defaults to today (UTC) at dispatch when absent.
    pub date: Option<NaiveDate>,
}

/// Fields for scheduling a meeting.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMeeting {
    pub title: String,
    pub scheduled_at: Option<Timestamp>,
    pub location: Option<String>,
    pub meeting_type: Option<String>,
}

/// Fields for moving a project to a new lifecycle status.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProjectStatus {
    pub project_id: EntityId,
    pub status: ProjectStatus,
}

/// Result of dispatching one command against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub record: Option<CommandRecord>,
    /// Internal outcome note (English), used as the composer fallback.
    pub message: String,
}

impl ExecutionOutcome {
    pub fn succeeded(record: CommandRecord, message: impl Into<String>) -> Self {
        Self {
            success: true,
            record: Some(record),
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            record: None,
            message: message.into(),
        }
    }
}

/// The record a successful command produced or changed.
///
/// Serialized untagged: each entity carries a distinct id field
/// (`task_id`, `lead_id`, ...), so the variants stay distinguishable on the
/// wire without an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum CommandRecord {
    Task(Task),
    Lead(Lead),
    TimeEntry(TimeEntry),
    Meeting(Meeting),
    Project(Project),
}

/// Outbound command response, returned for every interpreted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CommandResponse {
    pub action: ActionKind,
    /// Short restatement of what the system understood.
    pub summary: String,
    pub success: bool,
    /// The created or updated record, when there is one.
    pub result: Option<serde_json::Value>,
    /// Localized, user-facing sentence describing the outcome.
    pub message: String,
}

// ============================================================================
// DOMAIN ENTITIES
// ============================================================================

/// A task on the studio board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Task {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub task_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Uuid>))]
    pub project_id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub created_by: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub updated_at: Timestamp,
}

/// A sales lead in the CRM pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lead {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub lead_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    pub name: String,
    pub company: Option<String>,
    pub budget: Option<f64>,
    pub description: Option<String>,
    pub status: LeadStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub created_by: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub updated_at: Timestamp,
}

/// A logged unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimeEntry {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub entry_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Uuid>))]
    pub project_id: Option<EntityId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub user_id: EntityId,
    pub hours: f64,
    pub description: Option<String>,
    pub date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub created_at: Timestamp,
}

/// A scheduled meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Meeting {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub meeting_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    pub title: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<DateTime<Utc>>))]
    pub scheduled_at: Option<Timestamp>,
    pub location: Option<String>,
    pub meeting_type: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub created_by: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub created_at: Timestamp,
}

/// A client project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Project {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub project_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    pub name: String,
    pub status: ProjectStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub updated_at: Timestamp,
}

/// A client of the studio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Client {
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub client_id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = Uuid))]
    pub organization_id: EntityId,
    pub name: String,
    pub active: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = DateTime<Utc>))]
    pub created_at: Timestamp,
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {kind:?} with id {id}")]
    NotFound { kind: RecordKind, id: EntityId },

    #[error("Insert failed for {kind:?}: {reason}")]
    InsertFailed { kind: RecordKind, reason: String },

    #[error("Update failed for {kind:?} with id {id}: {reason}")]
    UpdateFailed {
        kind: RecordKind,
        id: EntityId,
        reason: String,
    },

    #[error("Query failed for {kind:?}: {reason}")]
    QueryFailed { kind: RecordKind, reason: String },

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Classification oracle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// No credential configured. Expected in dev; degrades classification
    /// instead of failing the request.
    #[error("No oracle credential configured")]
    NotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Transport error talking to {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl OracleError {
    /// Whether the failure should surface as a request-level error.
    /// Everything else degrades to an `unknown` classification.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            OracleError::RequestFailed { .. } | OracleError::Transport { .. }
        )
    }
}

/// Field validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing for {action:?}: {field}")]
    RequiredFieldMissing { action: ActionKind, field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Provider not supported: {provider}")]
    ProviderNotSupported { provider: String },
}

/// Master error type for all Atelier errors.
#[derive(Debug, Clone, Error)]
pub enum AtelierError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Atelier operations.
pub type AtelierResult<T> = Result<T, AtelierError>;

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn action_kind_strategy() -> impl Strategy<Value = ActionKind> {
        prop_oneof![
            Just(ActionKind::CreateTask),
            Just(ActionKind::CreateLead),
            Just(ActionKind::AddTime),
            Just(ActionKind::CreateMeeting),
            Just(ActionKind::UpdateProjectStatus),
            Just(ActionKind::Unknown),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every ActionKind survives a serde round trip unchanged.
        #[test]
        fn prop_action_kind_serde_round_trip(action in action_kind_strategy()) {
            let json = serde_json::to_string(&action).unwrap();
            let back: ActionKind = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(action, back);
        }

        /// Any action string outside the closed set deserializes to Unknown,
        /// never to an executable action.
        #[test]
        fn prop_arbitrary_action_names_collapse_to_unknown(name in "[a-z_]{1,24}") {
            prop_assume!(!matches!(
                name.as_str(),
                "create_task"
                    | "create_lead"
                    | "add_time"
                    | "create_meeting"
                    | "update_project_status"
                    | "unknown"
            ));
            let json = format!("\"{name}\"");
            let action: ActionKind = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(action, ActionKind::Unknown);
        }

        /// as_str always matches the serde wire name.
        #[test]
        fn prop_action_kind_as_str_matches_serde(action in action_kind_strategy()) {
            let json = serde_json::to_string(&action).unwrap();
            prop_assert_eq!(format!("\"{}\"", action.as_str()), json);
        }
    }
}
