//! Atelier Test Utilities
//!
//! Centralized test infrastructure for the Atelier workspace:
//! - Proptest generators for domain entity types
//! - Canned oracle replies for scripting the classifier
//! - Test fixtures for common scenarios
//! - Custom assertions for pipeline outcomes

// Re-export the in-memory store and scripted oracle from their source crates
pub use atelier_llm::{RecordedCall, ScriptedOracle, UnconfiguredOracle};
pub use atelier_store::InMemoryStore;

// Re-export core types for convenience
pub use atelier_core::{
    new_entity_id, ActionKind, AtelierError, AtelierResult, Client, ClientRef, CommandRecord,
    CommandRequest, CommandResponse, EntityId, Lead, LeadStatus, Locale, Meeting, OracleError,
    ParsedCommand, Project, ProjectRef, ProjectStatus, RecordKind, StoreError, Task, TaskPriority,
    TaskStatus, TimeEntry, Timestamp, ValidationError,
};

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Atelier entity types.

    use super::*;
    use proptest::prelude::*;

    // === Identity Type Generators ===

    /// Generate a random UUID (for generic ID generation).
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a valid UUIDv7 (timestamp-sortable).
    pub fn arb_uuid_v7() -> impl Strategy<Value = Uuid> {
        Just(()).prop_map(|_| Uuid::now_v7())
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // Generate timestamps within a reasonable range (2020-2030)
        (1577836800i64..1893456000i64)
            .prop_map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now))
    }

    /// Generate a NaiveDate between 2020 and 2029.
    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (2020i32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
        })
    }

    /// Generate an hour count a studio would actually log.
    pub fn arb_hours() -> impl Strategy<Value = f64> {
        0.25f64..100.0
    }

    // === Enum Generators ===

    /// Generate any ActionKind variant, including Unknown.
    pub fn arb_action_kind() -> impl Strategy<Value = ActionKind> {
        prop_oneof![
            Just(ActionKind::CreateTask),
            Just(ActionKind::CreateLead),
            Just(ActionKind::AddTime),
            Just(ActionKind::CreateMeeting),
            Just(ActionKind::UpdateProjectStatus),
            Just(ActionKind::Unknown),
        ]
    }

    /// Generate an executable ActionKind variant (never Unknown).
    pub fn arb_executable_action() -> impl Strategy<Value = ActionKind> {
        proptest::sample::select(ActionKind::executable().to_vec())
    }

    /// Generate a TaskPriority variant.
    pub fn arb_task_priority() -> impl Strategy<Value = TaskPriority> {
        prop_oneof![
            Just(TaskPriority::Low),
            Just(TaskPriority::Medium),
            Just(TaskPriority::High),
            Just(TaskPriority::Urgent),
        ]
    }

    /// Generate a TaskStatus variant.
    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Todo),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::Done),
        ]
    }

    /// Generate a LeadStatus variant.
    pub fn arb_lead_status() -> impl Strategy<Value = LeadStatus> {
        prop_oneof![
            Just(LeadStatus::New),
            Just(LeadStatus::Contacted),
            Just(LeadStatus::Qualified),
            Just(LeadStatus::Won),
            Just(LeadStatus::Lost),
        ]
    }

    /// Generate a ProjectStatus variant.
    pub fn arb_project_status() -> impl Strategy<Value = ProjectStatus> {
        prop_oneof![
            Just(ProjectStatus::Planning),
            Just(ProjectStatus::Active),
            Just(ProjectStatus::OnHold),
            Just(ProjectStatus::Completed),
            Just(ProjectStatus::Cancelled),
        ]
    }

    /// Generate a Locale variant.
    pub fn arb_locale() -> impl Strategy<Value = Locale> {
        prop_oneof![Just(Locale::En), Just(Locale::He)]
    }

    // === Struct Generators ===

    /// Generate a Task owned by the given organization and user.
    pub fn arb_task(organization_id: EntityId, created_by: EntityId) -> impl Strategy<Value = Task> {
        (
            arb_uuid_v7(),
            prop::option::of(arb_uuid_v7()),
            "[a-zA-Z0-9 ]{1,80}",
            prop::option::of("[a-zA-Z0-9 .,]{1,200}"),
            arb_task_priority(),
            arb_task_status(),
            prop::option::of(arb_date()),
            arb_timestamp(),
        )
            .prop_map(
                move |(task_id, project_id, title, description, priority, status, due_date, at)| {
                    Task {
                        task_id,
                        organization_id,
                        project_id,
                        title,
                        description,
                        priority,
                        status,
                        due_date,
                        created_by,
                        created_at: at,
                        updated_at: at,
                    }
                },
            )
    }

    /// Generate a Lead owned by the given organization and user.
    pub fn arb_lead(organization_id: EntityId, created_by: EntityId) -> impl Strategy<Value = Lead> {
        (
            arb_uuid_v7(),
            "[a-zA-Z ]{1,60}",
            prop::option::of("[a-zA-Z0-9 ]{1,60}"),
            prop::option::of(100.0f64..1_000_000.0),
            prop::option::of("[a-zA-Z0-9 .,]{1,200}"),
            arb_lead_status(),
            arb_timestamp(),
        )
            .prop_map(
                move |(lead_id, name, company, budget, description, status, at)| Lead {
                    lead_id,
                    organization_id,
                    name,
                    company,
                    budget,
                    description,
                    status,
                    created_by,
                    created_at: at,
                    updated_at: at,
                },
            )
    }

    /// Generate a TimeEntry logged by the given user.
    pub fn arb_time_entry(
        organization_id: EntityId,
        user_id: EntityId,
    ) -> impl Strategy<Value = TimeEntry> {
        (
            arb_uuid_v7(),
            prop::option::of(arb_uuid_v7()),
            arb_hours(),
            prop::option::of("[a-zA-Z0-9 ]{1,120}"),
            arb_date(),
            arb_timestamp(),
        )
            .prop_map(
                move |(entry_id, project_id, hours, description, date, created_at)| TimeEntry {
                    entry_id,
                    organization_id,
                    project_id,
                    user_id,
                    hours,
                    description,
                    date,
                    created_at,
                },
            )
    }

    /// Generate a Meeting scheduled by the given user.
    pub fn arb_meeting(
        organization_id: EntityId,
        created_by: EntityId,
    ) -> impl Strategy<Value = Meeting> {
        (
            arb_uuid_v7(),
            "[a-zA-Z0-9 ]{1,80}",
            prop::option::of(arb_timestamp()),
            prop::option::of("[a-zA-Z0-9 ]{1,60}"),
            prop::option::of(proptest::sample::select(vec![
                "call".to_string(),
                "kickoff".to_string(),
                "review".to_string(),
            ])),
            arb_timestamp(),
        )
            .prop_map(
                move |(meeting_id, title, scheduled_at, location, meeting_type, created_at)| {
                    Meeting {
                        meeting_id,
                        organization_id,
                        title,
                        scheduled_at,
                        location,
                        meeting_type,
                        created_by,
                        created_at,
                    }
                },
            )
    }

    /// Generate a Project owned by the given organization.
    pub fn arb_project(organization_id: EntityId) -> impl Strategy<Value = Project> {
        (arb_uuid_v7(), "[a-zA-Z0-9 ]{1,60}", arb_project_status(), arb_timestamp()).prop_map(
            move |(project_id, name, status, at)| Project {
                project_id,
                organization_id,
                name,
                status,
                created_at: at,
                updated_at: at,
            },
        )
    }

    /// Generate a Client owned by the given organization.
    pub fn arb_client(organization_id: EntityId) -> impl Strategy<Value = Client> {
        (arb_uuid_v7(), "[a-zA-Z ]{1,60}", any::<bool>(), arb_timestamp()).prop_map(
            move |(client_id, name, active, created_at)| Client {
                client_id,
                organization_id,
                name,
                active,
                created_at,
            },
        )
    }
}

// ============================================================================
// CANNED ORACLE REPLIES
// ============================================================================

pub mod replies {
    //! Canned classifier replies, shaped exactly like the oracle's JSON
    //! contract. Feed these to a [`ScriptedOracle`] to drive the pipeline
    //! down a specific path.

    use super::*;

    /// A create_task reply with an optional project reference.
    pub fn task_reply(title: &str, project_id: Option<EntityId>) -> String {
        let mut data = serde_json::json!({ "title": title });
        if let Some(id) = project_id {
            data["project_id"] = serde_json::json!(id);
        }
        serde_json::json!({
            "action": "create_task",
            "data": data,
            "summary": format!("Create a task titled '{}'", title),
        })
        .to_string()
    }

    /// A create_lead reply carrying only the contact name.
    pub fn lead_reply(name: &str) -> String {
        serde_json::json!({
            "action": "create_lead",
            "data": { "name": name },
            "summary": format!("Create a lead for {}", name),
        })
        .to_string()
    }

    /// An add_time reply with fractional hours support.
    pub fn time_reply(hours: f64, project_id: Option<EntityId>) -> String {
        let mut data = serde_json::json!({ "hours": hours });
        if let Some(id) = project_id {
            data["project_id"] = serde_json::json!(id);
        }
        serde_json::json!({
            "action": "add_time",
            "data": data,
            "summary": format!("Log {} hours", hours),
        })
        .to_string()
    }

    /// A create_meeting reply.
    pub fn meeting_reply(title: &str, scheduled_at: Option<&str>) -> String {
        let mut data = serde_json::json!({ "title": title });
        if let Some(at) = scheduled_at {
            data["scheduled_at"] = serde_json::json!(at);
        }
        serde_json::json!({
            "action": "create_meeting",
            "data": data,
            "summary": format!("Schedule a meeting titled '{}'", title),
        })
        .to_string()
    }

    /// An update_project_status reply.
    pub fn status_reply(project_id: EntityId, status: ProjectStatus) -> String {
        serde_json::json!({
            "action": "update_project_status",
            "data": { "project_id": project_id, "status": status.as_str() },
            "summary": format!("Move the project to {}", status.as_str()),
        })
        .to_string()
    }

    /// The degraded reply for an unintelligible message.
    pub fn unknown_reply() -> String {
        serde_json::json!({
            "action": "unknown",
            "data": {},
            "summary": "Could not understand the request",
        })
        .to_string()
    }

    /// Wrap a reply in a markdown code fence, the way chat-tuned models
    /// often decorate JSON output.
    pub fn fenced(reply: &str) -> String {
        format!("```json\n{}\n```", reply)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// A seeded studio tenant: a store with one active project and one
    /// active client, plus the ids every request needs.
    pub struct StudioFixture {
        pub store: Arc<InMemoryStore>,
        pub organization_id: EntityId,
        pub user_id: EntityId,
        pub project: Project,
        pub client: Client,
    }

    /// Create a studio with one active project ("Website redesign") and one
    /// active client ("Riverside Cafe").
    pub fn seeded_studio() -> StudioFixture {
        let store = Arc::new(InMemoryStore::new());
        let organization_id = new_entity_id();
        let user_id = new_entity_id();
        let project = store.seed_project(organization_id, "Website redesign", ProjectStatus::Active);
        let client = store.seed_client(organization_id, "Riverside Cafe", true);

        StudioFixture {
            store,
            organization_id,
            user_id,
            project,
            client,
        }
    }

    /// Create a studio with no seeded rows.
    pub fn empty_studio() -> StudioFixture {
        let store = Arc::new(InMemoryStore::new());
        let organization_id = new_entity_id();
        let user_id = new_entity_id();
        // Placeholder rows for tests that never touch them.
        let project = Project {
            project_id: new_entity_id(),
            organization_id,
            name: "unseeded".to_string(),
            status: ProjectStatus::Planning,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let client = Client {
            client_id: new_entity_id(),
            organization_id,
            name: "unseeded".to_string(),
            active: false,
            created_at: Utc::now(),
        };

        StudioFixture {
            store,
            organization_id,
            user_id,
            project,
            client,
        }
    }

    impl StudioFixture {
        /// Build a CommandRequest against this studio.
        pub fn request(&self, message: &str) -> CommandRequest {
            CommandRequest {
                message: message.to_string(),
                organization_id: self.organization_id,
                user_id: self.user_id,
            }
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for Atelier-specific validation.

    use super::*;

    /// Assert that an AtelierResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &AtelierResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that an AtelierResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &AtelierResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    /// Assert that an AtelierResult is a Store error.
    #[track_caller]
    pub fn assert_store_error<T: std::fmt::Debug>(result: &AtelierResult<T>) {
        match result {
            Err(AtelierError::Store(_)) => {}
            other => panic!("Expected Store error, got: {:?}", other),
        }
    }

    /// Assert that an AtelierResult is an Oracle error.
    #[track_caller]
    pub fn assert_oracle_error<T: std::fmt::Debug>(result: &AtelierResult<T>) {
        match result {
            Err(AtelierError::Oracle(_)) => {}
            other => panic!("Expected Oracle error, got: {:?}", other),
        }
    }

    /// Assert that an AtelierResult is a NotFound store error for the given
    /// record kind.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &AtelierResult<T>, kind: RecordKind) {
        match result {
            Err(AtelierError::Store(StoreError::NotFound { kind: k, .. })) => {
                assert_eq!(*k, kind, "Wrong record kind in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", kind, other),
        }
    }

    /// Assert that a response reports success with a record attached.
    #[track_caller]
    pub fn assert_succeeded(response: &CommandResponse) {
        assert!(
            response.success,
            "Expected success, got failure: {}",
            response.message
        );
        assert!(
            response.result.is_some(),
            "Successful response should carry the record"
        );
    }

    /// Assert that a response reports failure with no record, the shape
    /// shared by unknown classifications and rejected commands.
    #[track_caller]
    pub fn assert_failed_without_record(response: &CommandResponse) {
        assert!(!response.success, "Expected failure, got success");
        assert!(
            response.result.is_none(),
            "Failed response should not carry a record: {:?}",
            response.result
        );
        assert!(
            !response.message.is_empty(),
            "Failed response should still carry a user-facing message"
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
