//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{InsightError, Result};
use crate::llm::LlmClient;

const MOCK_MODEL: &str = "mock";

/// Marker that identifies an insight prompt.
const INSIGHT_MARKER: &str = "business analyst";

/// Canned insight answer returned for insight prompts.
const DEFAULT_INSIGHTS: &str = "- Electronics drives the largest share of revenue.\n\
- Fashion sells more units at a lower average price.\n\
- Accessories is the smallest category and has room to grow.";

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Custom mappings are matched case-insensitively against the whole prompt in
/// the order they were added. Without a match, SQL prompts get a query chosen
/// from keywords in the question and insight prompts get three bullets.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Patterns that make the call fail (pattern -> error message).
    failures: Vec<(String, String)>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the prompt contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes calls whose prompt contains `pattern` fail with a generation error.
    pub fn with_failure(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push((pattern.into(), message.into()));
        self
    }

    /// Number of completed or failed calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Generates a mock response based on the prompt.
    fn mock_response(&self, prompt: &str) -> Result<String> {
        let prompt_lower = prompt.to_lowercase();

        if let Some((_, message)) = self
            .failures
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(&pattern.to_lowercase()))
        {
            return Err(InsightError::generation(message.clone()));
        }

        // Check custom responses first
        if let Some((_, response)) = self
            .custom_responses
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(&pattern.to_lowercase()))
        {
            return Ok(response.clone());
        }

        if prompt_lower.contains(INSIGHT_MARKER) {
            return Ok(DEFAULT_INSIGHTS.to_string());
        }

        match extract_question(&prompt_lower) {
            Some(question) => Ok(sql_for_question(question)),
            None => Ok("I don't understand that question. Could you please rephrase it?".to_string()),
        }
    }
}

/// Pulls the user question out of a SQL-generation prompt.
fn extract_question(prompt: &str) -> Option<&str> {
    let (_, rest) = prompt.split_once("user question:")?;
    Some(rest.rsplit_once("sql:").map_or(rest, |(q, _)| q).trim())
}

fn sql_for_question(question: &str) -> String {
    if question.contains("category") {
        return "```sql\nSELECT category, SUM(price * quantity) AS revenue\nFROM sales\nGROUP BY category;\n```"
            .to_string();
    }

    if question.contains("product") {
        return "```sql\nSELECT product_name, SUM(price * quantity) AS revenue\nFROM sales\nGROUP BY product_name\nORDER BY revenue DESC;\n```"
            .to_string();
    }

    if question.contains("how many") || question.contains("count") {
        return "```sql\nSELECT COUNT(*) AS orders FROM sales;\n```".to_string();
    }

    if question.contains("revenue") {
        return "```sql\nSELECT SUM(price * quantity) AS revenue FROM sales;\n```".to_string();
    }

    "```sql\nSELECT * FROM sales LIMIT 10;\n```".to_string()
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.mock_response(prompt)
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}
