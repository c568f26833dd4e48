//! Command execution against the record store.
//!
//! Each validated command becomes exactly one org-scoped, user-attributed
//! store write. A store failure is reported in the outcome; it is never
//! retried here.

use atelier_core::{
    new_entity_id, CommandRecord, ExecutionOutcome, Lead, LeadStatus, Meeting, Task, TaskStatus,
    TimeEntry, ValidatedCommand,
};
use atelier_store::RecordStore;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Execute one validated command.
///
/// # Arguments
/// * `organization_id` - Tenant every write is scoped to
/// * `user_id` - Actor recorded on the created row
pub async fn dispatch(
    store: &dyn RecordStore,
    command: ValidatedCommand,
    organization_id: Uuid,
    user_id: Uuid,
) -> ExecutionOutcome {
    let action = command.action();
    let now = Utc::now();

    let result = match command {
        ValidatedCommand::CreateTask(fields) => {
            let task = Task {
                task_id: new_entity_id(),
                organization_id,
                project_id: fields.project_id,
                title: fields.title,
                description: fields.description,
                priority: fields.priority,
                status: TaskStatus::Todo,
                due_date: fields.due_date,
                created_by: user_id,
                created_at: now,
                updated_at: now,
            };
            store
                .task_insert(&task)
                .await
                .map(|()| (CommandRecord::Task(task), "task created"))
        }
        ValidatedCommand::CreateLead(fields) => {
            let lead = Lead {
                lead_id: new_entity_id(),
                organization_id,
                name: fields.name,
                company: fields.company,
                budget: fields.budget,
                description: fields.description,
                status: LeadStatus::New,
                created_by: user_id,
                created_at: now,
                updated_at: now,
            };
            store
                .lead_insert(&lead)
                .await
                .map(|()| (CommandRecord::Lead(lead), "lead created"))
        }
        ValidatedCommand::AddTime(fields) => {
            let entry = TimeEntry {
                entry_id: new_entity_id(),
                organization_id,
                project_id: fields.project_id,
                user_id,
                hours: fields.hours,
                description: fields.description,
                date: fields.date.unwrap_or_else(|| now.date_naive()),
                created_at: now,
            };
            store
                .time_entry_insert(&entry)
                .await
                .map(|()| (CommandRecord::TimeEntry(entry), "time entry logged"))
        }
        ValidatedCommand::CreateMeeting(fields) => {
            let meeting = Meeting {
                meeting_id: new_entity_id(),
                organization_id,
                title: fields.title,
                scheduled_at: fields.scheduled_at,
                location: fields.location,
                meeting_type: fields.meeting_type,
                created_by: user_id,
                created_at: now,
            };
            store
                .meeting_insert(&meeting)
                .await
                .map(|()| (CommandRecord::Meeting(meeting), "meeting created"))
        }
        ValidatedCommand::UpdateProjectStatus(fields) => store
            .project_update_status(organization_id, fields.project_id, fields.status)
            .await
            .map(|project| (CommandRecord::Project(project), "project status updated")),
    };

    match result {
        Ok((record, note)) => {
            debug!(action = action.as_str(), %organization_id, "command executed");
            ExecutionOutcome::succeeded(record, note)
        }
        Err(error) => {
            warn!(action = action.as_str(), %organization_id, %error, "store write failed");
            ExecutionOutcome::failed(error.to_string())
        }
    }
}
