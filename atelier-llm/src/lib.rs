//! Atelier LLM - Classification Oracle Layer
//!
//! Provider-agnostic trait for the text-classification oracle, concrete
//! Anthropic and OpenAI-compatible providers, and a scripted oracle for
//! tests. The interpreter never talks to a provider API directly; it only
//! sees the [`CommandOracle`] trait.

use async_trait::async_trait;
use atelier_core::{AtelierResult, ConfigError, OracleError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub mod providers;

pub use providers::{AnthropicOracle, OpenAIOracle};

// ============================================================================
// COMMAND ORACLE TRAIT
// ============================================================================

/// Trait for text-classification oracles.
/// Implementations must be thread-safe (Send + Sync).
///
/// One call is one single-turn, zero-temperature exchange: a fixed
/// instruction, the user's raw text, and the raw reply string back. Parsing
/// the reply is the caller's concern.
#[async_trait]
pub trait CommandOracle: Send + Sync {
    /// Run one classification exchange.
    ///
    /// # Arguments
    /// * `instruction` - System instruction constraining the reply format
    /// * `input` - The user's raw message
    ///
    /// # Returns
    /// * `Ok(String)` - The oracle's raw reply text
    /// * `Err(AtelierError::Oracle)` - If the exchange fails
    async fn classify_text(&self, instruction: &str, input: &str) -> AtelierResult<String>;

    /// Whether a credential is present and requests can be attempted.
    /// A false value means `classify_text` fails without any network call.
    fn is_configured(&self) -> bool;

    /// Provider name for logs and health reporting.
    fn provider_name(&self) -> &str;
}

// ============================================================================
// ORACLE CONFIGURATION
// ============================================================================

/// Supported oracle providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleKind {
    Anthropic,
    OpenAI,
}

impl OracleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleKind::Anthropic => "anthropic",
            OracleKind::OpenAI => "openai",
        }
    }

    /// Parse a provider name as it appears in configuration.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(OracleKind::Anthropic),
            "openai" => Ok(OracleKind::OpenAI),
            other => Err(ConfigError::ProviderNotSupported {
                provider: other.to_string(),
            }),
        }
    }
}

/// Oracle configuration, loaded from environment variables.
#[derive(Clone)]
pub struct OracleConfig {
    /// Which provider to talk to.
    pub kind: OracleKind,
    /// API credential. Absence is an expected condition: the oracle is built
    /// unconfigured and classification degrades instead of failing.
    pub api_key: Option<String>,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Base URL override, mainly for OpenAI-compatible endpoints.
    pub base_url: Option<String>,
    /// Upper bound on reply tokens. Replies are single JSON objects, so this
    /// stays small.
    pub max_reply_tokens: i32,
    /// Client-side request throttle.
    pub requests_per_minute: u32,
}

impl OracleConfig {
    /// Default model for a provider.
    pub fn default_model(kind: OracleKind) -> &'static str {
        match kind {
            OracleKind::Anthropic => "claude-3-5-haiku-20241022",
            OracleKind::OpenAI => "gpt-4o-mini",
        }
    }

    /// Create OracleConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ATELIER_ORACLE_PROVIDER`: "anthropic" or "openai" (default: "anthropic")
    /// - `ATELIER_ORACLE_API_KEY`: API credential (optional)
    /// - `ATELIER_ORACLE_MODEL`: Model identifier (default: per provider)
    /// - `ATELIER_ORACLE_BASE_URL`: Endpoint override (optional)
    /// - `ATELIER_ORACLE_MAX_REPLY_TOKENS`: Reply token cap (default: 512)
    /// - `ATELIER_ORACLE_RPM`: Client-side requests per minute (default: 50)
    pub fn from_env() -> AtelierResult<Self> {
        let kind = match std::env::var("ATELIER_ORACLE_PROVIDER") {
            Ok(name) => OracleKind::from_name(&name)?,
            Err(_) => OracleKind::Anthropic,
        };

        let api_key = std::env::var("ATELIER_ORACLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = std::env::var("ATELIER_ORACLE_MODEL")
            .ok()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| Self::default_model(kind).to_string());

        let base_url = std::env::var("ATELIER_ORACLE_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let max_reply_tokens = std::env::var("ATELIER_ORACLE_MAX_REPLY_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(512);

        let requests_per_minute = std::env::var("ATELIER_ORACLE_RPM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50);

        let config = Self {
            kind,
            api_key,
            model,
            base_url,
            max_reply_tokens,
            requests_per_minute,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AtelierResult<()> {
        if self.max_reply_tokens <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_reply_tokens".to_string(),
                value: self.max_reply_tokens.to_string(),
                reason: "max_reply_tokens must be greater than 0".to_string(),
            }
            .into());
        }

        if self.requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "requests_per_minute".to_string(),
                value: self.requests_per_minute.to_string(),
                reason: "requests_per_minute must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            kind: OracleKind::Anthropic,
            api_key: None,
            model: Self::default_model(OracleKind::Anthropic).to_string(),
            base_url: None,
            max_reply_tokens: 512,
            requests_per_minute: 50,
        }
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_reply_tokens", &self.max_reply_tokens)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

/// Build a [`CommandOracle`] from configuration.
///
/// A missing credential yields an [`UnconfiguredOracle`] rather than an
/// error, so the service starts and classification degrades per request.
pub fn build_oracle(config: &OracleConfig) -> Arc<dyn CommandOracle> {
    let Some(api_key) = config.api_key.clone() else {
        return Arc::new(UnconfiguredOracle { kind: config.kind });
    };

    match config.kind {
        OracleKind::Anthropic => {
            let mut oracle = AnthropicOracle::new(
                api_key,
                config.model.clone(),
                config.max_reply_tokens,
                config.requests_per_minute,
            );
            if let Some(url) = &config.base_url {
                oracle = oracle.with_base_url(url.clone());
            }
            Arc::new(oracle)
        }
        OracleKind::OpenAI => {
            let mut oracle = OpenAIOracle::new(
                api_key,
                config.model.clone(),
                config.max_reply_tokens,
                config.requests_per_minute,
            );
            if let Some(url) = &config.base_url {
                oracle = oracle.with_base_url(url.clone());
            }
            Arc::new(oracle)
        }
    }
}

/// Oracle stand-in used when no credential is configured.
/// Fails every call with `OracleError::NotConfigured` without touching the
/// network.
#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredOracle {
    kind: OracleKind,
}

impl UnconfiguredOracle {
    pub fn new(kind: OracleKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl CommandOracle for UnconfiguredOracle {
    async fn classify_text(&self, _instruction: &str, _input: &str) -> AtelierResult<String> {
        Err(OracleError::NotConfigured.into())
    }

    fn is_configured(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &str {
        self.kind.as_str()
    }
}

// ============================================================================
// SCRIPTED ORACLE FOR TESTING
// ============================================================================

/// One recorded oracle exchange, for assertions on what was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub instruction: String,
    pub input: String,
}

/// Scripted oracle for testing.
/// Returns queued replies in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<AtelierResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedOracle {
    /// Create a scripted oracle with no queued replies.
    /// Calls against an empty queue fail with `OracleError::InvalidResponse`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scripted oracle with a single queued reply.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::new().then_reply(reply)
    }

    /// Queue another successful reply.
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, error: OracleError) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(error.into()));
        }
        self
    }

    /// Create a scripted oracle whose first call fails.
    pub fn failing(error: OracleError) -> Self {
        Self::new().then_fail(error)
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CommandOracle for ScriptedOracle {
    async fn classify_text(&self, instruction: &str, input: &str) -> AtelierResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                instruction: instruction.to_string(),
                input: input.to_string(),
            });
        }

        let next = self.replies.lock().ok().and_then(|mut replies| replies.pop_front());
        match next {
            Some(reply) => reply,
            None => Err(OracleError::InvalidResponse {
                provider: "scripted".to_string(),
                reason: "no scripted reply queued".to_string(),
            }
            .into()),
        }
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

impl std::fmt::Debug for ScriptedOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedOracle")
            .field("queued_replies", &self.replies.lock().map(|r| r.len()).unwrap_or(0))
            .field("calls", &self.call_count())
            .finish()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
