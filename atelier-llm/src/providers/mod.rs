//! Oracle provider implementations
//!
//! Concrete implementations of the CommandOracle trait for hosted
//! classification backends.

use atelier_core::{AtelierError, OracleError};

mod throttle;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicOracle;
pub use openai::OpenAIOracle;

pub(crate) use throttle::Throttle;

pub(crate) fn transport(provider: &str, reason: impl Into<String>) -> AtelierError {
    AtelierError::Oracle(OracleError::Transport {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}

pub(crate) fn request_failed(
    provider: &str,
    status: u16,
    message: impl Into<String>,
) -> AtelierError {
    AtelierError::Oracle(OracleError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> AtelierError {
    AtelierError::Oracle(OracleError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}
