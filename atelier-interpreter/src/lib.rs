//! Natural-language command interpreter.
//!
//! Turns one free-text message into at most one org-scoped write and a
//! localized reply. The pipeline runs five stages in order:
//!
//! 1. [`context`] - load the organization's active projects and clients
//! 2. [`classify`] - ask the oracle for an action plus raw field data
//! 3. [`validate`] - check the data against the action's schema
//! 4. [`dispatch`] - perform the single store write
//! 5. [`respond`] - compose the localized response
//!
//! An unclassifiable message short-circuits after stage 2 with no write.
//! A validation rejection short-circuits after stage 3 the same way. Only
//! oracle transport and non-2xx failures surface as request-level errors;
//! everything else degrades into a well-formed failure response.

pub mod classify;
pub mod context;
pub mod dispatch;
mod messages;
pub mod respond;
pub mod validate;

pub use classify::classify;
pub use dispatch::dispatch;
pub use respond::compose;
pub use validate::validate;

use atelier_core::{
    ActionKind, AtelierResult, CommandRequest, CommandResponse, ExecutionOutcome, Locale,
};
use atelier_llm::CommandOracle;
use atelier_store::RecordStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// The interpreter pipeline, wired to a store and an oracle.
#[derive(Clone)]
pub struct CommandInterpreter {
    store: Arc<dyn RecordStore>,
    oracle: Arc<dyn CommandOracle>,
    locale: Locale,
}

impl CommandInterpreter {
    pub fn new(store: Arc<dyn RecordStore>, oracle: Arc<dyn CommandOracle>) -> Self {
        Self {
            store,
            oracle,
            locale: Locale::default(),
        }
    }

    /// Select the catalog used for user-facing messages.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Interpret one command request end to end.
    ///
    /// # Returns
    /// * `Ok(CommandResponse)` - Always well-formed; `success` reports
    ///   whether a write happened
    /// * `Err(AtelierError::Oracle)` - Oracle transport or non-2xx failure
    pub async fn interpret(&self, request: &CommandRequest) -> AtelierResult<CommandResponse> {
        debug!(
            organization_id = %request.organization_id,
            user_id = %request.user_id,
            message_len = request.message.len(),
            "interpreting command"
        );

        let reference = context::load(self.store.as_ref(), request.organization_id).await;

        let parsed = classify(
            self.oracle.as_ref(),
            &request.message,
            &reference,
            self.locale,
        )
        .await?;

        if parsed.action == ActionKind::Unknown {
            let outcome = ExecutionOutcome::failed("message not classified");
            return Ok(respond::compose(
                ActionKind::Unknown,
                &parsed.summary,
                &outcome,
                self.locale,
            ));
        }

        let command = match validate(&parsed) {
            Ok(command) => command,
            Err(error) => {
                warn!(action = parsed.action.as_str(), %error, "command rejected");
                let outcome = ExecutionOutcome::failed(error.to_string());
                return Ok(respond::compose(
                    parsed.action,
                    &parsed.summary,
                    &outcome,
                    self.locale,
                ));
            }
        };

        let action = command.action();
        let outcome = dispatch(
            self.store.as_ref(),
            command,
            request.organization_id,
            request.user_id,
        )
        .await;

        Ok(respond::compose(action, &parsed.summary, &outcome, self.locale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{new_entity_id, AtelierError, OracleError, ProjectStatus};
    use atelier_llm::ScriptedOracle;
    use atelier_store::InMemoryStore;

    fn request(message: &str, organization_id: uuid::Uuid) -> CommandRequest {
        CommandRequest {
            message: message.to_string(),
            organization_id,
            user_id: new_entity_id(),
        }
    }

    #[tokio::test]
    async fn test_task_created_against_project_from_context() {
        let store = InMemoryStore::new();
        let org = new_entity_id();
        let project = store.seed_project(org, "Website redesign", ProjectStatus::Active);

        let reply = format!(
            r#"{{"action": "create_task", "data": {{"title": "Draft wireframes", "project_id": "{}"}}, "summary": "Create a task for the website redesign"}}"#,
            project.project_id
        );
        let oracle = ScriptedOracle::with_reply(reply);
        let store = Arc::new(store);
        let interpreter =
            CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let response = interpreter
            .interpret(&request("add a task to draft wireframes for the website redesign", org))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.action, ActionKind::CreateTask);
        assert!(response.message.contains("Draft wireframes"));
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].project_id, Some(project.project_id));
        assert_eq!(tasks[0].organization_id, org);
    }

    #[tokio::test]
    async fn test_context_projects_reach_the_oracle_instruction() {
        let store = InMemoryStore::new();
        let org = new_entity_id();
        store.seed_project(org, "Website redesign", ProjectStatus::Active);

        let oracle = ScriptedOracle::with_reply(r#"{"action": "unknown", "data": {}, "summary": "x"}"#);
        let oracle = Arc::new(oracle);
        let interpreter = CommandInterpreter::new(Arc::new(store), oracle.clone());

        interpreter.interpret(&request("hello", org)).await.unwrap();

        let calls = oracle.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].instruction.contains("Website redesign"));
        assert_eq!(calls[0].input, "hello");
    }

    #[tokio::test]
    async fn test_fractional_hours_logged() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = ScriptedOracle::with_reply(
            r#"{"action": "add_time", "data": {"hours": 2.5, "description": "sketching"}, "summary": "Log 2.5 hours"}"#,
        );
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let response = interpreter
            .interpret(&request("log 2.5 hours of sketching", new_entity_id()))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.message.contains("2.5"));
        let entries = store.time_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hours, 2.5);
    }

    #[tokio::test]
    async fn test_gibberish_degrades_to_unknown_with_zero_writes() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = ScriptedOracle::with_reply(
            r#"{"action": "unknown", "data": {}, "summary": "Asked something unintelligible"}"#,
        );
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let response = interpreter
            .interpret(&request("florp the wibble", new_entity_id()))
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.action, ActionKind::Unknown);
        assert_eq!(response.result, None);
        assert!(!response.message.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_required_field_rejected_like_unknown() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = ScriptedOracle::with_reply(
            r#"{"action": "create_lead", "data": {"company": "Acme"}, "summary": "Register a lead"}"#,
        );
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let response = interpreter
            .interpret(&request("register a lead from Acme", new_entity_id()))
            .await
            .unwrap();

        // Same failure shape as an unclassifiable message.
        assert!(!response.success);
        assert_eq!(response.result, None);
        assert_eq!(response.action, ActionKind::CreateLead);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_oracle_transport_failure_is_request_level_error() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = ScriptedOracle::failing(OracleError::Transport {
            provider: "scripted".to_string(),
            reason: "connection reset".to_string(),
        });
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let result = interpreter.interpret(&request("add a task", new_entity_id())).await;

        assert!(matches!(
            result,
            Err(AtelierError::Oracle(OracleError::Transport { .. }))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_cross_tenant_update_fails_and_row_is_unchanged() {
        let store = InMemoryStore::new();
        let owner_org = new_entity_id();
        let caller_org = new_entity_id();
        let project = store.seed_project(owner_org, "Rebrand", ProjectStatus::Active);

        let reply = format!(
            r#"{{"action": "update_project_status", "data": {{"project_id": "{}", "status": "completed"}}, "summary": "Mark the rebrand completed"}}"#,
            project.project_id
        );
        let store = Arc::new(store);
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(ScriptedOracle::with_reply(reply)));

        let response = interpreter
            .interpret(&request("mark the rebrand as completed", caller_org))
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.action, ActionKind::UpdateProjectStatus);
        assert_eq!(response.result, None);
        let row = store.project(project.project_id).unwrap();
        assert_eq!(row.status, ProjectStatus::Active);
    }

    #[tokio::test]
    async fn test_unconfigured_oracle_degrades_instead_of_erroring() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = ScriptedOracle::failing(OracleError::NotConfigured);
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let response = interpreter
            .interpret(&request("add a task", new_entity_id()))
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.action, ActionKind::Unknown);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_context_read_failure_does_not_block_the_pipeline() {
        let store = InMemoryStore::new();
        store.fail_reads(true);
        let oracle = ScriptedOracle::with_reply(
            r#"{"action": "create_task", "data": {"title": "Call the printer"}, "summary": "Create a task"}"#,
        );
        let store = Arc::new(store);
        let interpreter = CommandInterpreter::new(store.clone(), Arc::new(oracle));

        let response = interpreter
            .interpret(&request("remind me to call the printer", new_entity_id()))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(store.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_locale_flows_through_to_the_reply() {
        let store = Arc::new(InMemoryStore::new());
        let oracle = ScriptedOracle::with_reply(
            r#"{"action": "create_task", "data": {"title": "x"}, "summary": "s"}"#,
        );
        let interpreter =
            CommandInterpreter::new(store, Arc::new(oracle)).with_locale(Locale::He);

        let response = interpreter
            .interpret(&request("משימה חדשה", new_entity_id()))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.message.contains('x'));
        assert!(response.message.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c)));
    }

    #[tokio::test]
    async fn test_summary_defaults_empty_when_oracle_omits_it() {
        let store = Arc::new(InMemoryStore::new());
        let oracle =
            ScriptedOracle::with_reply(r#"{"action": "create_task", "data": {"title": "x"}}"#);
        let interpreter = CommandInterpreter::new(store, Arc::new(oracle));

        let response = interpreter
            .interpret(&request("add a task", new_entity_id()))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.summary, "");
    }

    #[test]
    fn test_default_locale_is_english() {
        let built =
            CommandInterpreter::new(Arc::new(InMemoryStore::new()), Arc::new(ScriptedOracle::new()));
        assert_eq!(built.locale(), Locale::En);
    }
}
