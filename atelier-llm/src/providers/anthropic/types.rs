//! Wire types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};

/// Body of a `POST /messages` call.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub messages: Vec<Message>,
}

impl MessageRequest {
    /// One system instruction plus one user turn, the only shape the
    /// classifier sends. Temperature is pinned to zero so the same text
    /// classifies the same way every time.
    pub fn single_turn(model: &str, instruction: &str, input: &str, max_tokens: i32) -> Self {
        Self {
            model: model.to_string(),
            max_tokens,
            system: Some(instruction.to_string()),
            temperature: Some(0.0),
            messages: vec![Message {
                role: "user".to_string(),
                content: input.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Successful reply. Only the text blocks are consumed; `stop_reason` tells
/// us whether the reply hit the token cap.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Reply content arrives as typed blocks. Anything that is not text is
/// preserved as [`ContentBlock::Other`] and skipped downstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Error body returned alongside a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub message: String,
}
