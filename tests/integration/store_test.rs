//! Store integration tests.
//!
//! Runs queries against a seeded SQLite file through the read-only store.

use insightgen::config::StoreConfig;
use insightgen::db::seed::seed_demo_data;
use insightgen::db::{QueryResult, QueryStore, Schema, SqliteStore, Value};
use insightgen::error::InsightError;
use insightgen::query::{ExecutionOutcome, QueryExecutor};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::fixture_store;

#[tokio::test]
async fn test_revenue_by_category() {
    let (_dir, store) = fixture_store().await;

    let result = store
        .execute_query(
            "SELECT category, SUM(price*quantity) as revenue FROM sales \
             GROUP BY category ORDER BY category",
        )
        .await
        .unwrap();

    assert_eq!(result.column_names(), vec!["category", "revenue"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::from("Electronics"), Value::Float(90000.0)],
            vec![Value::from("Fashion"), Value::Float(10000.0)],
        ]
    );
    assert!(result.is_numeric_column(1));
    assert!(!result.is_numeric_column(0));
}

#[tokio::test]
async fn test_records_shape() {
    let (_dir, store) = fixture_store().await;

    let result = store
        .execute_query("SELECT product_name, quantity FROM sales ORDER BY order_id LIMIT 2")
        .await
        .unwrap();
    let records = serde_json::to_value(result.to_records()).unwrap();

    assert_eq!(
        records,
        json!({
            "data": [
                {"product_name": "Laptop", "quantity": 1},
                {"product_name": "Phone", "quantity": 2}
            ],
            "columns": ["product_name", "quantity"]
        })
    );
}

#[tokio::test]
async fn test_records_rebuild_result() {
    let (_dir, store) = fixture_store().await;

    let result = store
        .execute_query("SELECT category, quantity, price FROM sales ORDER BY order_id")
        .await
        .unwrap();
    let rebuilt = QueryResult::from_records(&result.to_records().data).unwrap();

    assert_eq!(rebuilt.column_names(), result.column_names());
    assert_eq!(rebuilt.rows, result.rows);
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let (_dir, store) = fixture_store().await;
    let executor = QueryExecutor::new(&store);

    let outcome = executor
        .execute("SELECT product_name, price FROM sales WHERE quantity > 100")
        .await
        .unwrap();

    match outcome {
        ExecutionOutcome::Empty(result) => {
            assert_eq!(result.column_names(), vec!["product_name", "price"]);
            assert_eq!(result.row_count, 0);
        }
        other => panic!("Expected empty outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_column_reports_store_message() {
    let (_dir, store) = fixture_store().await;

    let err = store
        .execute_query("SELECT revenue FROM sales")
        .await
        .unwrap_err();

    assert!(matches!(err, InsightError::Execution(_)));
    assert!(err.message().contains("no such column: revenue"));
}

#[tokio::test]
async fn test_read_only_store_rejects_writes() {
    let (_dir, store) = fixture_store().await;

    let err = store
        .execute_query("DELETE FROM sales")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::Execution(_)));

    let count = store
        .execute_query("SELECT COUNT(*) AS n FROM sales")
        .await
        .unwrap();
    assert_eq!(count.rows[0][0], Value::Int(4));
}

#[tokio::test]
async fn test_concurrent_queries_share_the_pool() {
    let (_dir, store) = fixture_store().await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.execute_query("SELECT COUNT(*) FROM sales").await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.rows[0][0], Value::Int(4));
    }
}

#[tokio::test]
async fn test_missing_database_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("absent.db"));

    let err = SqliteStore::open(&config).await.unwrap_err();

    assert!(matches!(err, InsightError::Connection(_)));
    assert!(!config.path.exists());
}

#[tokio::test]
async fn test_seed_demo_data_is_queryable() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("nested").join("sales.db"));

    let writer = SqliteStore::open_writable(&config).await.unwrap();
    let inserted = seed_demo_data(&writer, &Schema::sales(), 50).await.unwrap();
    assert_eq!(inserted, 50);

    let result = writer
        .execute_query("SELECT COUNT(DISTINCT category) AS categories, MIN(quantity), MAX(quantity) FROM sales")
        .await
        .unwrap();
    let row = &result.rows[0];
    assert!(matches!(row[0], Value::Int(n) if (1..=3).contains(&n)));
    assert!(matches!(row[1], Value::Int(n) if n >= 1));
    assert!(matches!(row[2], Value::Int(n) if n <= 5));
}
