//! Localized message catalogs.
//!
//! Every user-facing sentence the interpreter produces comes from here,
//! keyed by locale and outcome. Diagnostics in logs stay English and never
//! go through this module.

use atelier_core::{ActionKind, Locale, ProjectStatus};

/// Summary text used when a message could not be classified.
pub(crate) fn unknown_summary(locale: Locale) -> String {
    match locale {
        Locale::En => "Could not understand the request".to_string(),
        Locale::He => "לא ניתן היה להבין את הבקשה".to_string(),
    }
}

pub(crate) fn created_task(locale: Locale, title: &str) -> String {
    match locale {
        Locale::En => format!("Created task \"{}\"", title),
        Locale::He => format!("המשימה \"{}\" נוצרה", title),
    }
}

pub(crate) fn created_lead(locale: Locale, name: &str) -> String {
    match locale {
        Locale::En => format!("Added lead \"{}\"", name),
        Locale::He => format!("הליד \"{}\" נוסף", name),
    }
}

pub(crate) fn logged_time(locale: Locale, hours: f64) -> String {
    match locale {
        Locale::En => format!("Logged {} hours", hours),
        Locale::He => format!("נרשמו {} שעות", hours),
    }
}

pub(crate) fn scheduled_meeting(locale: Locale, title: &str) -> String {
    match locale {
        Locale::En => format!("Scheduled meeting \"{}\"", title),
        Locale::He => format!("הפגישה \"{}\" נקבעה", title),
    }
}

pub(crate) fn project_status_updated(locale: Locale, name: &str, status: ProjectStatus) -> String {
    match locale {
        Locale::En => format!("Moved project \"{}\" to {}", name, status_label(locale, status)),
        Locale::He => format!(
            "סטטוס הפרויקט \"{}\" עודכן ל{}",
            name,
            status_label(locale, status)
        ),
    }
}

/// Failure sentence for an action, including `Unknown`.
pub(crate) fn failure_message(locale: Locale, action: ActionKind) -> String {
    match (locale, action) {
        (Locale::En, ActionKind::CreateTask) => "Couldn't create the task.".to_string(),
        (Locale::En, ActionKind::CreateLead) => "Couldn't add the lead.".to_string(),
        (Locale::En, ActionKind::AddTime) => "Couldn't log the time.".to_string(),
        (Locale::En, ActionKind::CreateMeeting) => "Couldn't schedule the meeting.".to_string(),
        (Locale::En, ActionKind::UpdateProjectStatus) => {
            "Couldn't update the project status.".to_string()
        }
        (Locale::En, ActionKind::Unknown) => {
            "Sorry, I couldn't work out what to do with that.".to_string()
        }
        (Locale::He, ActionKind::CreateTask) => "לא הצלחתי ליצור את המשימה.".to_string(),
        (Locale::He, ActionKind::CreateLead) => "לא הצלחתי להוסיף את הליד.".to_string(),
        (Locale::He, ActionKind::AddTime) => "לא הצלחתי לרשום את השעות.".to_string(),
        (Locale::He, ActionKind::CreateMeeting) => "לא הצלחתי לקבוע את הפגישה.".to_string(),
        (Locale::He, ActionKind::UpdateProjectStatus) => {
            "לא הצלחתי לעדכן את סטטוס הפרויקט.".to_string()
        }
        (Locale::He, ActionKind::Unknown) => {
            "מצטער, לא הצלחתי להבין מה לעשות עם זה.".to_string()
        }
    }
}

/// Localized label for a project status, used in interpolations.
pub(crate) fn status_label(locale: Locale, status: ProjectStatus) -> &'static str {
    match (locale, status) {
        (Locale::En, ProjectStatus::Planning) => "planning",
        (Locale::En, ProjectStatus::Active) => "active",
        (Locale::En, ProjectStatus::OnHold) => "on hold",
        (Locale::En, ProjectStatus::Completed) => "completed",
        (Locale::En, ProjectStatus::Cancelled) => "cancelled",
        (Locale::He, ProjectStatus::Planning) => "תכנון",
        (Locale::He, ProjectStatus::Active) => "פעיל",
        (Locale::He, ProjectStatus::OnHold) => "בהמתנה",
        (Locale::He, ProjectStatus::Completed) => "הושלם",
        (Locale::He, ProjectStatus::Cancelled) => "בוטל",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_has_a_failure_message_in_both_locales() {
        let mut actions = ActionKind::executable().to_vec();
        actions.push(ActionKind::Unknown);
        for action in actions {
            for locale in [Locale::En, Locale::He] {
                assert!(!failure_message(locale, action).is_empty());
            }
        }
    }

    #[test]
    fn test_hours_interpolation_drops_trailing_zero() {
        assert_eq!(logged_time(Locale::En, 2.5), "Logged 2.5 hours");
        assert_eq!(logged_time(Locale::En, 2.0), "Logged 2 hours");
    }

    #[test]
    fn test_status_labels_localized() {
        assert_eq!(status_label(Locale::En, ProjectStatus::OnHold), "on hold");
        assert_eq!(status_label(Locale::He, ProjectStatus::Active), "פעיל");
    }
}
