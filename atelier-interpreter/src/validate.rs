//! Per-action field validation.
//!
//! Turns the oracle's loose JSON `data` map into a [`ValidatedCommand`]
//! with owned, typed fields. A missing or malformed required field rejects
//! the whole command; a malformed optional field is dropped with a warning
//! and the command proceeds without it.

use atelier_core::{
    ActionKind, AddTime, CreateLead, CreateMeeting, CreateTask, EntityId, ParsedCommand,
    ProjectStatus, TaskPriority, Timestamp, UpdateProjectStatus, ValidatedCommand, ValidationError,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

type Data = Map<String, Value>;

/// Validate a parsed command against its action's schema.
///
/// # Returns
/// * `Ok(ValidatedCommand)` - Every required field present and well-formed
/// * `Err(ValidationError)` - Rejection; the caller treats it like an
///   unclassifiable message and performs no write
pub fn validate(parsed: &ParsedCommand) -> Result<ValidatedCommand, ValidationError> {
    let data = &parsed.data;

    match parsed.action {
        ActionKind::CreateTask => Ok(ValidatedCommand::CreateTask(CreateTask {
            title: required_string(data, ActionKind::CreateTask, "title")?,
            project_id: optional_uuid(data, "project_id"),
            description: optional_string(data, "description"),
            priority: optional_priority(data),
            due_date: optional_date(data, "due_date"),
        })),
        ActionKind::CreateLead => Ok(ValidatedCommand::CreateLead(CreateLead {
            name: required_string(data, ActionKind::CreateLead, "name")?,
            company: optional_string(data, "company"),
            budget: optional_number(data, "budget"),
            description: optional_string(data, "description"),
        })),
        ActionKind::AddTime => Ok(ValidatedCommand::AddTime(AddTime {
            hours: required_hours(data)?,
            description: optional_string(data, "description"),
            project_id: optional_uuid(data, "project_id"),
            date: optional_date(data, "date"),
        })),
        ActionKind::CreateMeeting => Ok(ValidatedCommand::CreateMeeting(CreateMeeting {
            title: required_string(data, ActionKind::CreateMeeting, "title")?,
            scheduled_at: optional_datetime(data, "scheduled_at"),
            location: optional_string(data, "location"),
            meeting_type: optional_string(data, "meeting_type"),
        })),
        ActionKind::UpdateProjectStatus => {
            Ok(ValidatedCommand::UpdateProjectStatus(UpdateProjectStatus {
                project_id: required_uuid(data, ActionKind::UpdateProjectStatus, "project_id")?,
                status: required_status(data)?,
            }))
        }
        ActionKind::Unknown => Err(ValidationError::InvalidValue {
            field: "action".to_string(),
            reason: "unknown action has no schema".to_string(),
        }),
    }
}

// ============================================================================
// Field Helpers
// ============================================================================

fn required_string(data: &Data, action: ActionKind, field: &str) -> Result<String, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Err(ValidationError::RequiredFieldMissing {
            action,
            field: field.to_string(),
        }),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        }),
        Some(other) => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a string, got {}", value_kind(other)),
        }),
    }
}

fn optional_string(data: &Data, field: &str) -> Option<String> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::String(_)) => None,
        Some(other) => {
            warn!(field, got = value_kind(other), "dropping non-string optional field");
            None
        }
    }
}

/// Coerce a JSON value to a finite f64. Accepts numbers and numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn optional_number(data: &Data, field: &str) -> Option<f64> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match as_number(value) {
            Some(n) => Some(n),
            None => {
                warn!(field, "dropping non-numeric optional field");
                None
            }
        },
    }
}

fn required_hours(data: &Data) -> Result<f64, ValidationError> {
    let value = match data.get("hours") {
        None | Some(Value::Null) => {
            return Err(ValidationError::RequiredFieldMissing {
                action: ActionKind::AddTime,
                field: "hours".to_string(),
            })
        }
        Some(value) => value,
    };

    match as_number(value) {
        Some(hours) if hours > 0.0 => Ok(hours),
        Some(_) => Err(ValidationError::InvalidValue {
            field: "hours".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        None => Err(ValidationError::InvalidValue {
            field: "hours".to_string(),
            reason: "must be a number".to_string(),
        }),
    }
}

fn parse_uuid(value: &Value) -> Option<EntityId> {
    value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
}

fn optional_uuid(data: &Data, field: &str) -> Option<EntityId> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match parse_uuid(value) {
            Some(id) => Some(id),
            None => {
                warn!(field, "dropping unparseable optional id");
                None
            }
        },
    }
}

fn required_uuid(data: &Data, action: ActionKind, field: &str) -> Result<EntityId, ValidationError> {
    match data.get(field) {
        None | Some(Value::Null) => Err(ValidationError::RequiredFieldMissing {
            action,
            field: field.to_string(),
        }),
        Some(value) => parse_uuid(value).ok_or_else(|| ValidationError::InvalidValue {
            field: field.to_string(),
            reason: "must be a UUID".to_string(),
        }),
    }
}

fn optional_date(data: &Data, field: &str) -> Option<NaiveDate> {
    let s = match data.get(field) {
        Some(Value::String(s)) => s.trim(),
        None | Some(Value::Null) => return None,
        Some(other) => {
            warn!(field, got = value_kind(other), "dropping non-string date field");
            return None;
        }
    };

    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(field, "dropping unparseable date");
            None
        }
    }
}

/// Parse an ISO 8601 datetime. Falls back to a bare datetime without
/// offset (assumed UTC), then to a bare date at midnight UTC.
fn optional_datetime(data: &Data, field: &str) -> Option<Timestamp> {
    let s = match data.get(field) {
        Some(Value::String(s)) => s.trim(),
        None | Some(Value::Null) => return None,
        Some(other) => {
            warn!(field, got = value_kind(other), "dropping non-string datetime field");
            return None;
        }
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Some(naive.and_utc());
        }
    }

    warn!(field, "dropping unparseable datetime");
    None
}

/// Priority is optional with a fixed default; an out-of-set value falls
/// back to the default rather than rejecting the task.
fn optional_priority(data: &Data) -> TaskPriority {
    match data.get("priority") {
        None | Some(Value::Null) => TaskPriority::default(),
        Some(value) => match serde_json::from_value::<TaskPriority>(value.clone()) {
            Ok(priority) => priority,
            Err(_) => {
                warn!("dropping unrecognized priority, using default");
                TaskPriority::default()
            }
        },
    }
}

fn required_status(data: &Data) -> Result<ProjectStatus, ValidationError> {
    match data.get("status") {
        None | Some(Value::Null) => Err(ValidationError::RequiredFieldMissing {
            action: ActionKind::UpdateProjectStatus,
            field: "status".to_string(),
        }),
        Some(value) => {
            serde_json::from_value::<ProjectStatus>(value.clone()).map_err(|_| {
                ValidationError::InvalidValue {
                    field: "status".to_string(),
                    reason: "expected one of planning, active, on_hold, completed, cancelled"
                        .to_string(),
                }
            })
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed(action: ActionKind, data: Value) -> ParsedCommand {
        ParsedCommand {
            action,
            data: data.as_object().cloned().unwrap_or_default(),
            summary: "test".to_string(),
        }
    }

    #[test]
    fn test_create_task_full_fields() {
        let id = Uuid::now_v7();
        let command = parsed(
            ActionKind::CreateTask,
            json!({
                "title": "Order fabric samples",
                "project_id": id.to_string(),
                "description": "for the showroom",
                "priority": "high",
                "due_date": "2026-09-01",
            }),
        );

        let ValidatedCommand::CreateTask(task) = validate(&command).unwrap() else {
            panic!("expected CreateTask");
        };
        assert_eq!(task.title, "Order fabric samples");
        assert_eq!(task.project_id, Some(id));
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(
            task.due_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
    }

    #[test]
    fn test_create_task_missing_title_rejected() {
        let command = parsed(ActionKind::CreateTask, json!({"priority": "low"}));
        assert_eq!(
            validate(&command),
            Err(ValidationError::RequiredFieldMissing {
                action: ActionKind::CreateTask,
                field: "title".to_string(),
            })
        );
    }

    #[test]
    fn test_create_task_blank_title_rejected() {
        let command = parsed(ActionKind::CreateTask, json!({"title": "   "}));
        assert!(matches!(
            validate(&command),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_create_task_non_string_title_rejected() {
        let command = parsed(ActionKind::CreateTask, json!({"title": 42}));
        assert!(matches!(
            validate(&command),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_create_task_priority_defaults_when_absent_or_bad() {
        for data in [json!({"title": "x"}), json!({"title": "x", "priority": "asap"})] {
            let command = parsed(ActionKind::CreateTask, data);
            let ValidatedCommand::CreateTask(task) = validate(&command).unwrap() else {
                panic!("expected CreateTask");
            };
            assert_eq!(task.priority, TaskPriority::Medium);
        }
    }

    #[test]
    fn test_create_task_bad_optional_fields_dropped() {
        let command = parsed(
            ActionKind::CreateTask,
            json!({
                "title": "x",
                "project_id": "not-a-uuid",
                "due_date": "next tuesday",
                "description": "",
            }),
        );

        let ValidatedCommand::CreateTask(task) = validate(&command).unwrap() else {
            panic!("expected CreateTask");
        };
        assert_eq!(task.project_id, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_create_lead_missing_name_rejected() {
        let command = parsed(ActionKind::CreateLead, json!({"company": "Acme"}));
        assert_eq!(
            validate(&command),
            Err(ValidationError::RequiredFieldMissing {
                action: ActionKind::CreateLead,
                field: "name".to_string(),
            })
        );
    }

    #[test]
    fn test_create_lead_budget_coerced_from_string() {
        let command = parsed(
            ActionKind::CreateLead,
            json!({"name": "Dana", "budget": "15000"}),
        );
        let ValidatedCommand::CreateLead(lead) = validate(&command).unwrap() else {
            panic!("expected CreateLead");
        };
        assert_eq!(lead.budget, Some(15000.0));
    }

    #[test]
    fn test_create_lead_unparseable_budget_dropped() {
        let command = parsed(
            ActionKind::CreateLead,
            json!({"name": "Dana", "budget": "a lot"}),
        );
        let ValidatedCommand::CreateLead(lead) = validate(&command).unwrap() else {
            panic!("expected CreateLead");
        };
        assert_eq!(lead.budget, None);
    }

    #[test]
    fn test_add_time_fractional_hours() {
        let command = parsed(ActionKind::AddTime, json!({"hours": 2.5}));
        let ValidatedCommand::AddTime(entry) = validate(&command).unwrap() else {
            panic!("expected AddTime");
        };
        assert_eq!(entry.hours, 2.5);
        assert_eq!(entry.date, None);
    }

    #[test]
    fn test_add_time_hours_coerced_from_string() {
        let command = parsed(ActionKind::AddTime, json!({"hours": "3.25"}));
        let ValidatedCommand::AddTime(entry) = validate(&command).unwrap() else {
            panic!("expected AddTime");
        };
        assert_eq!(entry.hours, 3.25);
    }

    #[test]
    fn test_add_time_missing_hours_rejected() {
        let command = parsed(ActionKind::AddTime, json!({"description": "sketching"}));
        assert_eq!(
            validate(&command),
            Err(ValidationError::RequiredFieldMissing {
                action: ActionKind::AddTime,
                field: "hours".to_string(),
            })
        );
    }

    #[test]
    fn test_add_time_non_numeric_hours_rejected() {
        let command = parsed(ActionKind::AddTime, json!({"hours": "a while"}));
        assert!(matches!(
            validate(&command),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_add_time_zero_hours_rejected() {
        let command = parsed(ActionKind::AddTime, json!({"hours": 0}));
        assert!(matches!(
            validate(&command),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_create_meeting_rfc3339_datetime() {
        let command = parsed(
            ActionKind::CreateMeeting,
            json!({"title": "Kickoff", "scheduled_at": "2026-09-01T14:30:00+02:00"}),
        );
        let ValidatedCommand::CreateMeeting(meeting) = validate(&command).unwrap() else {
            panic!("expected CreateMeeting");
        };
        let expected = DateTime::parse_from_rfc3339("2026-09-01T12:30:00Z").unwrap();
        assert_eq!(meeting.scheduled_at, Some(expected.with_timezone(&Utc)));
    }

    #[test]
    fn test_create_meeting_bare_date_becomes_midnight_utc() {
        let command = parsed(
            ActionKind::CreateMeeting,
            json!({"title": "Kickoff", "scheduled_at": "2026-09-01"}),
        );
        let ValidatedCommand::CreateMeeting(meeting) = validate(&command).unwrap() else {
            panic!("expected CreateMeeting");
        };
        let scheduled = meeting.scheduled_at.unwrap();
        assert_eq!(scheduled.to_rfc3339(), "2026-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_create_meeting_unparseable_datetime_dropped() {
        let command = parsed(
            ActionKind::CreateMeeting,
            json!({"title": "Kickoff", "scheduled_at": "whenever works"}),
        );
        let ValidatedCommand::CreateMeeting(meeting) = validate(&command).unwrap() else {
            panic!("expected CreateMeeting");
        };
        assert_eq!(meeting.scheduled_at, None);
    }

    #[test]
    fn test_update_project_status_happy_path() {
        let id = Uuid::now_v7();
        let command = parsed(
            ActionKind::UpdateProjectStatus,
            json!({"project_id": id.to_string(), "status": "on_hold"}),
        );
        let ValidatedCommand::UpdateProjectStatus(update) = validate(&command).unwrap() else {
            panic!("expected UpdateProjectStatus");
        };
        assert_eq!(update.project_id, id);
        assert_eq!(update.status, ProjectStatus::OnHold);
    }

    #[test]
    fn test_update_project_status_requires_both_fields() {
        let id = Uuid::now_v7();

        let missing_status = parsed(
            ActionKind::UpdateProjectStatus,
            json!({"project_id": id.to_string()}),
        );
        assert_eq!(
            validate(&missing_status),
            Err(ValidationError::RequiredFieldMissing {
                action: ActionKind::UpdateProjectStatus,
                field: "status".to_string(),
            })
        );

        let missing_id = parsed(ActionKind::UpdateProjectStatus, json!({"status": "active"}));
        assert_eq!(
            validate(&missing_id),
            Err(ValidationError::RequiredFieldMissing {
                action: ActionKind::UpdateProjectStatus,
                field: "project_id".to_string(),
            })
        );
    }

    #[test]
    fn test_update_project_status_rejects_bad_values() {
        let bad_id = parsed(
            ActionKind::UpdateProjectStatus,
            json!({"project_id": "proj-7", "status": "active"}),
        );
        assert!(matches!(
            validate(&bad_id),
            Err(ValidationError::InvalidValue { .. })
        ));

        let bad_status = parsed(
            ActionKind::UpdateProjectStatus,
            json!({"project_id": Uuid::now_v7().to_string(), "status": "paused"}),
        );
        assert!(matches!(
            validate(&bad_status),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_action_has_no_schema() {
        let command = parsed(ActionKind::Unknown, json!({}));
        assert!(validate(&command).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| serde_json::json!(n)),
            any::<f64>().prop_map(|n| serde_json::to_value(n).unwrap_or(Value::Null)),
            "[a-zA-Z0-9 .:-]{0,24}".prop_map(Value::String),
        ]
    }

    fn arb_data() -> impl Strategy<Value = Map<String, Value>> {
        let keys = prop_oneof![
            Just("title".to_string()),
            Just("name".to_string()),
            Just("hours".to_string()),
            Just("project_id".to_string()),
            Just("status".to_string()),
            Just("priority".to_string()),
            Just("due_date".to_string()),
            Just("scheduled_at".to_string()),
            "[a-z_]{1,12}",
        ];
        proptest::collection::hash_map(keys, arb_value(), 0..6)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_validate_total_over_arbitrary_data(data in arb_data()) {
            for action in ActionKind::executable() {
                let command = ParsedCommand {
                    action,
                    data: data.clone(),
                    summary: String::new(),
                };
                // Must reject or accept, never panic.
                let _ = validate(&command);
            }
        }

        #[test]
        fn prop_hours_survive_string_coercion(hours in 0.1f64..10_000.0) {
            let command = ParsedCommand {
                action: ActionKind::AddTime,
                data: serde_json::json!({"hours": hours.to_string()})
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                summary: String::new(),
            };
            let ValidatedCommand::AddTime(entry) = validate(&command).unwrap() else {
                panic!("expected AddTime");
            };
            prop_assert_eq!(entry.hours, hours);
        }
    }
}
