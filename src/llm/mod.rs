//! LLM integration for InsightGen.
//!
//! The model gateway: a text-completion trait plus provider implementations.
//! Every call is one request and one response. Provider failures come back as
//! [`InsightError::Generation`](crate::error::InsightError::Generation); the
//! returned text is untrusted and is validated by the caller.

pub mod factory;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod prompt;

pub use factory::create_client;
pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use prompt::{build_insight_prompt, build_sql_prompt, format_preview_table, PREVIEW_ROW_LIMIT};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) so one client can serve
/// concurrent requests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `prompt` and returns the model's complete text response.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier sent with each request, for logging.
    fn model(&self) -> &str;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini
    #[default]
    Gemini,
    /// OpenAI (GPT-4o, etc.)
    OpenAi,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
