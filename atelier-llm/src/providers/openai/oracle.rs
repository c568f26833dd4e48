//! Command oracle backed by OpenAI chat models, or any endpoint speaking
//! the same wire format.

use super::client::OpenAIClient;
use super::types::{CompletionRequest, CompletionResponse};
use super::PROVIDER;
use crate::providers::invalid_response;
use crate::CommandOracle;
use async_trait::async_trait;
use atelier_core::AtelierResult;

pub struct OpenAIOracle {
    client: OpenAIClient,
    model: String,
    max_reply_tokens: i32,
}

impl OpenAIOracle {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_reply_tokens: i32,
        requests_per_minute: u32,
    ) -> Self {
        Self {
            client: OpenAIClient::new(api_key, requests_per_minute),
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

#[async_trait]
impl CommandOracle for OpenAIOracle {
    async fn classify_text(&self, instruction: &str, input: &str) -> AtelierResult<String> {
        let request =
            CompletionRequest::single_turn(&self.model, instruction, input, self.max_reply_tokens);
        let reply: CompletionResponse = self.client.post("chat/completions", &request).await?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| invalid_response(PROVIDER, "reply contained no choices"))?;

        // A reply cut off at the token cap cannot be the complete JSON
        // object the instruction asks for.
        if choice.finish_reason.as_deref() == Some("length") {
            return Err(invalid_response(
                PROVIDER,
                "reply truncated at the reply-token cap",
            ));
        }

        Ok(choice.message.content)
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

impl std::fmt::Debug for OpenAIOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIOracle")
            .field("model", &self.model)
            .field("max_reply_tokens", &self.max_reply_tokens)
            .finish()
    }
}
