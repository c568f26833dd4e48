//! Response composition.
//!
//! Builds the final [`CommandResponse`] from an execution outcome: a
//! localized message keyed on (action, success), the created record as
//! `result` on success, and the classifier's summary either way. Total
//! over every action and locale, so composition itself cannot fail.

use crate::messages;
use atelier_core::{ActionKind, CommandRecord, CommandResponse, ExecutionOutcome, Locale};
use tracing::warn;

/// Compose the response for one interpreted command.
pub fn compose(
    action: ActionKind,
    summary: &str,
    outcome: &ExecutionOutcome,
    locale: Locale,
) -> CommandResponse {
    let message = if outcome.success {
        match &outcome.record {
            Some(record) => success_message(record, locale),
            None => {
                // Success without a record should not happen; fall back to
                // the internal outcome note rather than failing the reply.
                warn!(action = action.as_str(), "successful outcome carried no record");
                outcome.message.clone()
            }
        }
    } else {
        messages::failure_message(locale, action)
    };

    let result = outcome
        .record
        .as_ref()
        .filter(|_| outcome.success)
        .and_then(|record| match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(action = action.as_str(), %error, "record serialization failed");
                None
            }
        });

    CommandResponse {
        action,
        summary: summary.to_string(),
        success: outcome.success,
        result,
        message,
    }
}

/// Interpolate the salient field of the created record into the localized
/// success template.
fn success_message(record: &CommandRecord, locale: Locale) -> String {
    match record {
        CommandRecord::Task(task) => messages::created_task(locale, &task.title),
        CommandRecord::Lead(lead) => messages::created_lead(locale, &lead.name),
        CommandRecord::TimeEntry(entry) => messages::logged_time(locale, entry.hours),
        CommandRecord::Meeting(meeting) => messages::scheduled_meeting(locale, &meeting.title),
        CommandRecord::Project(project) => {
            messages::project_status_updated(locale, &project.name, project.status)
        }
    }
}
