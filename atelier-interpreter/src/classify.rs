//! Intent classification via the command oracle.
//!
//! Builds a constrained instruction (closed action set, per-action field
//! names, the organization's reference context), sends the user's text
//! through the oracle once, and parses the JSON reply into a
//! [`ParsedCommand`].
//!
//! Degrade rules: a missing credential or an unparseable reply becomes an
//! `unknown` classification. Only transport and non-2xx failures propagate
//! as errors.

use crate::messages;
use atelier_core::{AtelierError, AtelierResult, Locale, OracleError, ParsedCommand, ReferenceContext};
use atelier_llm::CommandOracle;
use tracing::{debug, warn};

/// Fixed part of the classification instruction.
///
/// The action list, field names, and output format mirror the validator's
/// schemas exactly; anything the oracle invents outside them is dropped or
/// rejected downstream.
const CLASSIFY_INSTRUCTION: &str = r#"You turn short messages from a studio management app into structured commands.
Reply with a single JSON object and nothing else.

AVAILABLE ACTIONS:
- create_task: data fields: title (required), project_id, description, priority (low|medium|high|urgent), due_date (YYYY-MM-DD)
- create_lead: data fields: name (required), company, budget (number), description
- add_time: data fields: hours (number, required), description, project_id, date (YYYY-MM-DD)
- create_meeting: data fields: title (required), scheduled_at (ISO 8601 datetime), location, meeting_type
- update_project_status: data fields: project_id (required), status (planning|active|on_hold|completed|cancelled) (required)
- unknown: the message fits none of the above

RULES:
- Extract ONLY values the message actually states. Never invent or guess missing values.
- Omit a field entirely rather than sending null or an empty string.
- When the message names a project or client from the CONTEXT sections, use its listed id for project_id.
- Dates and datetimes must be ISO 8601.
- summary is one short sentence restating what the user asked for.

OUTPUT FORMAT (JSON only, no explanation):
{"action": "create_task", "data": {"title": "..."}, "summary": "..."}

Examples:
"add a task to order fabric samples" -> {"action": "create_task", "data": {"title": "order fabric samples"}, "summary": "Create a task to order fabric samples"}
"log 2.5 hours on the rebrand" -> {"action": "add_time", "data": {"hours": 2.5}, "summary": "Log 2.5 hours of work"}
"what's the weather like" -> {"action": "unknown", "data": {}, "summary": "Asked about the weather"}
"#;

/// Build the full instruction for one request: the fixed part plus the
/// organization's reference context.
pub(crate) fn build_instruction(context: &ReferenceContext) -> String {
    let mut instruction = String::from(CLASSIFY_INSTRUCTION);

    if !context.projects.is_empty() {
        instruction.push_str("\nCONTEXT - ACTIVE PROJECTS (name -> project_id):\n");
        for project in &context.projects {
            instruction.push_str(&format!("- {} -> {}\n", project.name, project.id));
        }
    }

    if !context.clients.is_empty() {
        instruction.push_str("\nCONTEXT - ACTIVE CLIENTS:\n");
        for client in &context.clients {
            instruction.push_str(&format!("- {}\n", client.name));
        }
    }

    instruction
}

/// Classify one message.
///
/// # Returns
/// * `Ok(ParsedCommand)` - Classification result; `action` may be `Unknown`
/// * `Err(AtelierError::Oracle)` - Transport or non-2xx failure only
pub async fn classify(
    oracle: &dyn CommandOracle,
    message: &str,
    context: &ReferenceContext,
    locale: Locale,
) -> AtelierResult<ParsedCommand> {
    let instruction = build_instruction(context);

    let reply = match oracle.classify_text(&instruction, message).await {
        Ok(reply) => reply,
        Err(AtelierError::Oracle(error)) if !error.is_hard() => {
            warn!(provider = oracle.provider_name(), %error, "oracle unavailable, degrading to unknown");
            return Ok(ParsedCommand::unknown(messages::unknown_summary(locale)));
        }
        Err(error) => return Err(error),
    };

    match parse_reply(&reply) {
        Some(parsed) => {
            debug!(action = parsed.action.as_str(), "message classified");
            Ok(parsed)
        }
        None => {
            warn!(
                provider = oracle.provider_name(),
                reply_len = reply.len(),
                "unparseable oracle reply, degrading to unknown"
            );
            Ok(ParsedCommand::unknown(messages::unknown_summary(locale)))
        }
    }
}

/// Parse an oracle reply into a [`ParsedCommand`], tolerating prose and
/// markdown fences around the JSON object.
pub(crate) fn parse_reply(reply: &str) -> Option<ParsedCommand> {
    let json = extract_json(reply)?;
    serde_json::from_str(json).ok()
}

/// Extract the JSON object from an oracle reply (handles surrounding text
/// and ```json fences).
fn extract_json(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();

    // Strip a fenced block first, if present.
    let body = if let Some(after_fence) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        after_fence.split("```").next().unwrap_or(after_fence)
    } else {
        trimmed
    };

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}
