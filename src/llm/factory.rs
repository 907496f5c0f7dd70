//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{InsightError, Result};
use crate::llm::{
    GeminiClient, GeminiConfig, LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig,
};

/// Environment variables checked for a Gemini key, in order.
const GEMINI_KEY_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Environment variables checked for an OpenAI key.
const OPENAI_KEY_VARS: &[&str] = &["OPENAI_API_KEY"];

/// Model used for OpenAI when the configured model names a Gemini model.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Creates an LLM client from configuration.
///
/// The key is resolved in order:
/// 1. `api_key` in the config
/// 2. The provider's environment variable (`GOOGLE_API_KEY`, then
///    `GEMINI_API_KEY` for Gemini; `OPENAI_API_KEY` for OpenAI)
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(InsightError::config)?;

    match provider {
        LlmProvider::Gemini => {
            let key = resolve_key(config.api_key.as_deref(), GEMINI_KEY_VARS)?;
            let client_config =
                GeminiConfig::new(key, &config.model).with_timeout(config.timeout_secs);
            Ok(Box::new(GeminiClient::new(client_config)?))
        }
        LlmProvider::OpenAi => {
            let key = resolve_key(config.api_key.as_deref(), OPENAI_KEY_VARS)?;
            let model = if config.model.starts_with("gemini") {
                DEFAULT_OPENAI_MODEL
            } else {
                &config.model
            };
            let client_config = OpenAiConfig::new(key, model).with_timeout(config.timeout_secs);
            Ok(Box::new(OpenAiClient::new(client_config)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

fn resolve_key(configured: Option<&str>, vars: &[&str]) -> Result<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            vars.iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|key| !key.trim().is_empty())
        })
        .ok_or_else(|| {
            InsightError::config(format!(
                "No API key configured. Set {} or add api_key under [llm].",
                vars.join(" or ")
            ))
        })
}
