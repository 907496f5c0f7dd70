//! Query execution against the store.
//!
//! Provides isolated query execution that can be tested independently
//! of the pipeline. Safety validation is the caller's job.

use std::time::Instant;
use tracing::{debug, info};

use crate::db::{QueryResult, QueryStore};
use crate::error::Result;

/// Runs validated queries and classifies the outcome.
pub struct QueryExecutor<'a> {
    store: &'a dyn QueryStore,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(store: &'a dyn QueryStore) -> Self {
        Self { store }
    }

    /// Executes `sql` and materializes every row.
    ///
    /// Store errors come back as [`InsightError::Execution`](crate::error::InsightError::Execution)
    /// carrying the store's message. Zero rows is an [`ExecutionOutcome::Empty`],
    /// not an error.
    pub async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        debug!(sql, "Executing query");
        let start = Instant::now();
        let result = self.store.execute_query(sql).await?;
        let elapsed = start.elapsed();

        info!(rows = result.row_count, elapsed_ms = elapsed.as_millis() as u64, "Query executed");

        if result.is_empty() {
            Ok(ExecutionOutcome::Empty(result))
        } else {
            Ok(ExecutionOutcome::Rows(result))
        }
    }
}

/// Result of executing a query.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// At least one row came back.
    Rows(QueryResult),
    /// The query ran but matched nothing. Column names are kept.
    Empty(QueryResult),
}

impl ExecutionOutcome {
    /// Returns true for [`ExecutionOutcome::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Borrows the underlying result.
    pub fn result(&self) -> &QueryResult {
        match self {
            Self::Rows(result) | Self::Empty(result) => result,
        }
    }

    /// Takes the underlying result.
    pub fn into_result(self) -> QueryResult {
        match self {
            Self::Rows(result) | Self::Empty(result) => result,
        }
    }
}
