//! Command oracle backed by Claude models.

use super::client::AnthropicClient;
use super::types::{ContentBlock, MessageRequest, MessageResponse};
use super::PROVIDER;
use crate::providers::invalid_response;
use crate::CommandOracle;
use async_trait::async_trait;
use atelier_core::AtelierResult;

pub struct AnthropicOracle {
    client: AnthropicClient,
    model: String,
    max_reply_tokens: i32,
}

impl AnthropicOracle {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_reply_tokens: i32,
        requests_per_minute: u32,
    ) -> Self {
        Self {
            client: AnthropicClient::new(api_key, requests_per_minute),
            model: model.into(),
            max_reply_tokens,
        }
    }

    /// Override the endpoint base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }
}

/// Join the text blocks of a reply in order; `None` when there are none.
fn collect_text(blocks: Vec<ContentBlock>) -> Option<String> {
    let parts: Vec<String> = blocks
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[async_trait]
impl CommandOracle for AnthropicOracle {
    async fn classify_text(&self, instruction: &str, input: &str) -> AtelierResult<String> {
        let request =
            MessageRequest::single_turn(&self.model, instruction, input, self.max_reply_tokens);
        let reply: MessageResponse = self.client.post("messages", &request).await?;

        // A reply that hit the token cap cannot be the complete JSON object
        // the instruction asks for.
        if reply.stop_reason.as_deref() == Some("max_tokens") {
            return Err(invalid_response(
                PROVIDER,
                "reply truncated at the reply-token cap",
            ));
        }

        collect_text(reply.content)
            .ok_or_else(|| invalid_response(PROVIDER, "reply contained no text blocks"))
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

impl std::fmt::Debug for AnthropicOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicOracle")
            .field("model", &self.model)
            .field("max_reply_tokens", &self.max_reply_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_text_joins_blocks_and_skips_non_text() {
        let blocks = vec![
            ContentBlock::Text {
                text: "first".to_string(),
            },
            ContentBlock::Other,
            ContentBlock::Text {
                text: "second".to_string(),
            },
        ];
        assert_eq!(collect_text(blocks).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_collect_text_without_text_blocks_is_none() {
        assert_eq!(collect_text(vec![]), None);
        assert_eq!(collect_text(vec![ContentBlock::Other]), None);
    }
}
