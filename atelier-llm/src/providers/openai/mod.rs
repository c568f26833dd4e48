//! OpenAI-compatible oracle provider

pub mod client;
pub mod oracle;
pub mod types;

pub use client::OpenAIClient;
pub use oracle::OpenAIOracle;

pub(crate) const PROVIDER: &str = "openai";
