//! SQLite store implementation.
//!
//! Provides the `SqliteStore` struct that implements the `QueryStore` trait
//! using sqlx.

use crate::config::StoreConfig;
use crate::db::{ColumnInfo, QueryResult, QueryStore, Row, Value};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Sqlite, Statement, TypeInfo, ValueRef};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long to wait for a pooled connection before giving up.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLite-backed store for the `sales` relation.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens an existing database file read-only.
    ///
    /// Queries issued through a read-only handle cannot modify the file even
    /// if a write statement slipped past validation.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .read_only(true)
            .create_if_missing(false);
        Self::connect(options, config).await
    }

    /// Opens the database file for writing, creating it if necessary.
    ///
    /// Used by the demo seeder only.
    pub async fn open_writable(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    InsightError::connection(format!(
                        "Failed to create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);
        Self::connect(options, config).await
    }

    /// Wraps an existing pool.
    ///
    /// This is primarily useful for testing.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn connect(options: SqliteConnectOptions, config: &StoreConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| {
                InsightError::connection(format!(
                    "Cannot open store at {}: {e}",
                    config.path.display()
                ))
            })?;

        info!("Store opened at {}", config.path.display());
        Ok(Self { pool })
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| InsightError::connection(format!("Failed to acquire connection: {e}")))
    }

    /// Fetches column metadata for a query that returned no rows.
    async fn describe_columns(conn: &mut PoolConnection<Sqlite>, sql: &str) -> Vec<ColumnInfo> {
        match (&mut **conn).prepare(sql).await {
            Ok(statement) => statement
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            Err(e) => {
                debug!("Could not describe empty result columns: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl QueryStore for SqliteStore {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        // The connection goes back to the pool when `conn` drops, on every path.
        let mut conn = self.acquire().await?;
        let start = Instant::now();

        let rows: Vec<SqliteRow> = sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| InsightError::execution(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = match rows.first() {
            Some(first_row) => column_info(first_row),
            None => Self::describe_columns(&mut conn, sql).await,
        };

        let rows: Vec<Row> = rows.iter().map(convert_row).collect();
        debug!("Query returned {} rows in {:?}", rows.len(), execution_time);

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Builds column metadata from the first row.
///
/// Expression columns (`SUM(...)`, `COUNT(*)`) have no declared type, so the
/// storage class of the first value stands in for it.
fn column_info(row: &SqliteRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let declared = col.type_info().name();
            let data_type = if declared.eq_ignore_ascii_case("NULL") {
                row.try_get_raw(i)
                    .map(|raw| raw.type_info().name().to_string())
                    .unwrap_or_else(|_| declared.to_string())
            } else {
                declared.to_string()
            };
            ColumnInfo::new(col.name(), data_type)
        })
        .collect()
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a single column value using the value's storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "INTEGER" | "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT and anything else decodes as a string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Extracts the store's own message from a sqlx error.
fn format_query_error(error: sqlx::Error) -> String {
    match error {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}
