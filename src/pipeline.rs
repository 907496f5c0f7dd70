//! Pipeline controller for InsightGen.
//!
//! Sequences one question through prompt building, SQL generation,
//! sanitizing, safety validation, execution, chart selection and insight
//! generation, and folds the outcome into a [`ResponseEnvelope`].
//!
//! Generation, safety and execution failures end the request with no tabular
//! output. An insight failure only degrades the insight text.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::SafetyConfig;
use crate::db::{QueryResult, QueryStore, Schema};
use crate::error::{InsightError, Result};
use crate::llm::{build_insight_prompt, build_sql_prompt, LlmClient};
use crate::query::{select_chart, ChartSelection, ExecutionOutcome, QueryExecutor};
use crate::safety::{clean, validate_read_only};

/// Returned by [`Pipeline::generate_insights`] for a result without rows.
pub const NO_DATA_MESSAGE: &str = "No data available to generate insights.";

/// Prefix of the placeholder used when the insight call fails.
pub const INSIGHT_PLACEHOLDER_PREFIX: &str = "- Unable to generate insights:";

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStatus {
    /// SQL, rows, chart and insights are all present.
    Complete,
    /// Rows and chart are present; insights hold the failure placeholder.
    InsightDegraded,
    /// The query ran and matched no rows.
    EmptyResult,
    /// The question was rejected or the model call failed.
    GenerationFailure,
    /// The generated SQL failed safety validation and was not executed.
    UnsafeQuery,
    /// The store rejected the query.
    ExecutionFailure,
}

impl PipelineStatus {
    /// Status for a request that ended with `error`.
    fn from_error(error: &InsightError) -> Self {
        match error {
            InsightError::UnsafeQuery(_) => Self::UnsafeQuery,
            InsightError::Execution(_) | InsightError::Connection(_) => Self::ExecutionFailure,
            _ => Self::GenerationFailure,
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Complete => "Complete",
            Self::InsightDegraded => "Insight degraded",
            Self::EmptyResult => "Empty result",
            Self::GenerationFailure => "Generation failure",
            Self::UnsafeQuery => "Unsafe query",
            Self::ExecutionFailure => "Execution failure",
        };
        write!(f, "{label}")
    }
}

/// Everything one question produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub question: String,
    /// Sanitized SQL, present once the model answered.
    pub sql: Option<String>,
    pub status: PipelineStatus,
    /// Present for `Complete`, `InsightDegraded` and `EmptyResult`.
    pub result: Option<QueryResult>,
    pub chart: Option<ChartSelection>,
    pub insights: Option<String>,
    /// Display text of the error that ended the request.
    pub error: Option<String>,
}

impl ResponseEnvelope {
    fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            sql: None,
            status: PipelineStatus::GenerationFailure,
            result: None,
            chart: None,
            insights: None,
            error: None,
        }
    }

    fn failed(mut self, error: &InsightError) -> Self {
        self.status = PipelineStatus::from_error(error);
        self.error = Some(error.to_string());
        self
    }
}

/// Runs questions through the model and the store.
///
/// Holds only shared read-only collaborators, so one pipeline can serve
/// concurrent requests.
pub struct Pipeline {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn QueryStore>,
    schema: Schema,
    safety: SafetyConfig,
}

impl Pipeline {
    /// Creates a pipeline over the `sales` schema with strict validation.
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn QueryStore>) -> Self {
        Self {
            llm,
            store,
            schema: Schema::sales(),
            safety: SafetyConfig::default(),
        }
    }

    /// Replaces the safety settings.
    pub fn with_safety(mut self, safety: SafetyConfig) -> Self {
        self.safety = safety;
        self
    }

    /// Generates validated SQL for a question.
    pub async fn generate_sql(&self, question: &str) -> Result<String> {
        let sql = self.request_sql(question).await?;
        self.validate(&sql)?;
        Ok(sql)
    }

    /// Validates and executes a SQL query.
    pub async fn execute_sql(&self, sql: &str) -> Result<ExecutionOutcome> {
        self.validate(sql)?;
        QueryExecutor::new(self.store.as_ref()).execute(sql).await
    }

    /// Asks the model for business insights on the first rows of `result`.
    pub async fn generate_insights(&self, result: &QueryResult) -> Result<String> {
        generate_insights(self.llm.as_ref(), result).await
    }

    /// Runs the full pipeline for one question.
    ///
    /// Never fails: every outcome, including errors, is reported in the
    /// returned envelope.
    pub async fn run(&self, question: &str) -> ResponseEnvelope {
        let mut envelope = ResponseEnvelope::new(question);

        let sql = match self.request_sql(question).await {
            Ok(sql) => sql,
            Err(e) => {
                warn!(error = %e, "SQL generation failed");
                return envelope.failed(&e);
            }
        };
        envelope.sql = Some(sql.clone());

        if let Err(e) = self.validate(&sql) {
            warn!(sql = %sql, error = %e, "Rejected generated query");
            return envelope.failed(&e);
        }

        let outcome = match QueryExecutor::new(self.store.as_ref()).execute(&sql).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Query execution failed");
                return envelope.failed(&e);
            }
        };

        let result = match outcome {
            ExecutionOutcome::Empty(result) => {
                info!("Query returned no rows");
                envelope.status = PipelineStatus::EmptyResult;
                envelope.result = Some(result);
                return envelope;
            }
            ExecutionOutcome::Rows(result) => result,
        };

        let chart = select_chart(&result);
        debug!(?chart, "Selected chart");

        let (insights, status) = match self.generate_insights(&result).await {
            Ok(insights) => (insights, PipelineStatus::Complete),
            Err(e) => {
                warn!(error = %e, "Insight generation failed, continuing without insights");
                (
                    format!("{} {}", INSIGHT_PLACEHOLDER_PREFIX, e.message()),
                    PipelineStatus::InsightDegraded,
                )
            }
        };

        info!(status = %status, rows = result.row_count, "Pipeline finished");

        envelope.status = status;
        envelope.chart = Some(chart);
        envelope.result = Some(result);
        envelope.insights = Some(insights);
        envelope
    }

    async fn request_sql(&self, question: &str) -> Result<String> {
        request_sql(self.llm.as_ref(), &self.schema, question).await
    }

    fn validate(&self, sql: &str) -> Result<()> {
        validate_read_only(sql, self.safety.strict)
    }
}

/// Builds the SQL prompt, calls the model and strips code fences.
///
/// The returned text has not been validated.
pub async fn request_sql(llm: &dyn LlmClient, schema: &Schema, question: &str) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(InsightError::invalid_input("Question must not be empty."));
    }

    let prompt = build_sql_prompt(schema, question);
    debug!(model = llm.model(), "Requesting SQL");
    let response = llm.complete(&prompt).await?;

    let sql = clean(&response);
    debug!(sql = %sql, "Generated SQL");
    Ok(sql)
}

/// Asks the model for business insights on the first rows of `result`.
///
/// A result without rows gets [`NO_DATA_MESSAGE`] and no model call.
pub async fn generate_insights(llm: &dyn LlmClient, result: &QueryResult) -> Result<String> {
    if result.is_empty() {
        return Ok(NO_DATA_MESSAGE.to_string());
    }

    let prompt = build_insight_prompt(result);
    debug!(model = llm.model(), rows = result.row_count, "Requesting insights");
    let insights = llm.complete(&prompt).await?;
    Ok(insights.trim().to_string())
}
