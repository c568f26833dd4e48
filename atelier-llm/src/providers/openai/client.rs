//! HTTP transport for the OpenAI chat completions API.
//!
//! Also used for OpenAI-compatible endpoints via a base URL override.

use super::types::ErrorEnvelope;
use super::PROVIDER;
use crate::providers::{invalid_response, request_failed, transport, Throttle};
use atelier_core::AtelierResult;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Thin POST-and-decode client, throttled to the configured request rate.
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    base_url: String,
    throttle: Throttle,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle: Throttle::per_minute(requests_per_minute),
        }
    }

    /// Point the client at a compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// POST `body` to `endpoint` and decode the JSON reply.
    ///
    /// Holds a throttle slot for the whole round trip. A non-2xx status is
    /// decoded as the provider's error envelope when possible, so the
    /// upstream message survives into our error.
    pub async fn post<Req, Res>(&self, endpoint: &str, body: &Req) -> AtelierResult<Res>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let _slot = self.throttle.pace(PROVIDER).await?;

        let reply = self
            .http
            .post(format!("{}/{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(PROVIDER, e.to_string()))?;

        let status = reply.status();
        if status.is_success() {
            return reply
                .json()
                .await
                .map_err(|e| invalid_response(PROVIDER, format!("undecodable reply: {}", e)));
        }

        let raw = reply
            .text()
            .await
            .unwrap_or_else(|_| "unreadable error body".to_string());
        let detail = serde_json::from_str::<ErrorEnvelope>(&raw)
            .map(|envelope| envelope.error.message)
            .unwrap_or(raw);

        Err(request_failed(PROVIDER, status.as_u16(), detail))
    }
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
