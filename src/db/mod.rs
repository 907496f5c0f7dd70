//! Store abstraction layer for InsightGen.
//!
//! Provides a trait-based interface for running read-only queries, so the
//! pipeline can be exercised against the SQLite store or an in-memory mock.

mod mock;
mod schema;
pub mod seed;
mod sqlite;
mod types;

pub use mock::MockQueryStore;
pub use schema::{Column, Schema, Table, SALES_TABLE};
pub use sqlite::SqliteStore;
pub use types::{ColumnInfo, QueryRecords, QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for query stores.
///
/// Implementations acquire a connection per call and release it before
/// returning, on success and on error alike.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Executes a SQL query and materializes every row.
    ///
    /// Errors raised by the store itself are returned as
    /// [`InsightError::Execution`](crate::error::InsightError::Execution)
    /// carrying the store's message.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the store and any pooled connections.
    async fn close(&self) -> Result<()>;
}
