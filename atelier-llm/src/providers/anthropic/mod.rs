//! Anthropic oracle provider

pub mod client;
pub mod oracle;
pub mod types;

pub use client::AnthropicClient;
pub use oracle::AnthropicOracle;

pub(crate) const PROVIDER: &str = "anthropic";
