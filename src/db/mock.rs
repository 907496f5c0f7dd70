//! Mock query store for testing.
//!
//! Returns a scripted result or error and counts how often it was called,
//! so tests can assert that a stage was (or was not) reached.

use super::{QueryResult, QueryStore};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum Scripted {
    Rows(QueryResult),
    Error(String),
}

/// A mock store that returns a predefined outcome for every query.
pub struct MockQueryStore {
    outcome: Scripted,
    calls: AtomicUsize,
    last_sql: Mutex<Option<String>>,
}

impl MockQueryStore {
    /// Creates a store that answers every query with `result`.
    pub fn returning(result: QueryResult) -> Self {
        Self::scripted(Scripted::Rows(result))
    }

    /// Creates a store that answers every query with zero rows.
    pub fn empty() -> Self {
        Self::returning(QueryResult::new())
    }

    /// Creates a store that rejects every query with the given store message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted(Scripted::Error(message.into()))
    }

    fn scripted(outcome: Scripted) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_sql: Mutex::new(None),
        }
    }

    /// Number of `execute_query` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// SQL text of the most recent call.
    pub fn last_sql(&self) -> Option<String> {
        self.last_sql.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl QueryStore for MockQueryStore {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_sql.lock() {
            *guard = Some(sql.to_string());
        }

        match &self.outcome {
            Scripted::Rows(result) => Ok(result.clone()),
            Scripted::Error(message) => Err(InsightError::execution(message.clone())),
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, Value};

    #[tokio::test]
    async fn test_mock_returns_scripted_rows() {
        let result =
            QueryResult::with_data(vec![ColumnInfo::new("n", "INTEGER")], vec![vec![Value::Int(1)]]);
        let store = MockQueryStore::returning(result);

        let got = store.execute_query("SELECT 1 AS n").await.unwrap();

        assert_eq!(got.row_count, 1);
        assert_eq!(store.calls(), 1);
        assert_eq!(store.last_sql().as_deref(), Some("SELECT 1 AS n"));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let store = MockQueryStore::failing("no such column: foo");
        let err = store.execute_query("SELECT foo FROM sales").await.unwrap_err();
        assert!(matches!(err, InsightError::Execution(_)));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_empty() {
        let store = MockQueryStore::empty();
        assert!(store.execute_query("SELECT 1").await.unwrap().is_empty());
    }
}
