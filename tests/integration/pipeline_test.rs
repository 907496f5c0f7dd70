//! End-to-end pipeline tests.
//!
//! A scripted mock model answers the prompts; queries run against a real
//! SQLite file, or against a mock store where call counts matter.

use std::sync::Arc;

use insightgen::config::SafetyConfig;
use insightgen::db::{ColumnInfo, MockQueryStore, QueryRecords, QueryResult, QueryStore, Value};
use insightgen::llm::MockLlmClient;
use insightgen::pipeline::{generate_insights, Pipeline, PipelineStatus, NO_DATA_MESSAGE};
use insightgen::query::ChartSelection;
use pretty_assertions::assert_eq;
use serde_json::json;

use super::fixture_store;

const SQL_MARKER: &str = "expert SQL developer";
const INSIGHT_MARKER: &str = "business analyst";

const REVENUE_RESPONSE: &str =
    "```sql\nSELECT category, SUM(price*quantity) as revenue FROM sales GROUP BY category\n```";
const REVENUE_SQL: &str =
    "SELECT category, SUM(price*quantity) as revenue FROM sales GROUP BY category";

fn scripted(sql_response: &str) -> Arc<MockLlmClient> {
    Arc::new(MockLlmClient::new().with_response(SQL_MARKER, sql_response))
}

#[tokio::test]
async fn test_revenue_by_category_completes() {
    let (_dir, store) = fixture_store().await;
    let llm = scripted(REVENUE_RESPONSE);
    let pipeline = Pipeline::new(llm.clone(), Arc::new(store));

    let envelope = pipeline.run("total revenue by category").await;

    assert_eq!(envelope.status, PipelineStatus::Complete);
    assert_eq!(envelope.sql.as_deref(), Some(REVENUE_SQL));
    assert_eq!(
        envelope.chart,
        Some(ChartSelection::Bar {
            x: "category".to_string(),
            y: "revenue".to_string()
        })
    );
    assert!(envelope.error.is_none());

    let result = envelope.result.unwrap();
    assert_eq!(result.row_count, 2);
    assert!(result
        .rows
        .contains(&vec![Value::from("Electronics"), Value::Float(90000.0)]));

    let insights = envelope.insights.unwrap();
    assert_eq!(insights.lines().filter(|l| l.starts_with("- ")).count(), 3);

    // One SQL call, one insight call
    assert_eq!(llm.calls(), 2);
    let prompts = llm.prompts();
    assert!(prompts[0].contains("total revenue by category"));
    assert!(prompts[1].contains(INSIGHT_MARKER));
    assert!(prompts[1].contains("Electronics"));
}

#[tokio::test]
async fn test_single_metric_is_scalar() {
    let (_dir, store) = fixture_store().await;
    let llm = scripted("SELECT SUM(price*quantity) / 3 AS total FROM sales");
    let pipeline = Pipeline::new(llm, Arc::new(store));

    let envelope = pipeline.run("average revenue per third").await;

    assert_eq!(envelope.status, PipelineStatus::Complete);
    assert_eq!(
        envelope.chart,
        Some(ChartSelection::Scalar {
            column: "total".to_string(),
            value: 33333
        })
    );
}

#[tokio::test]
async fn test_unsafe_query_never_reaches_store() {
    let llm = scripted("```sql\nDELETE FROM sales\n```");
    let store = Arc::new(MockQueryStore::returning(QueryResult::new()));
    let pipeline = Pipeline::new(llm.clone(), store.clone());

    let envelope = pipeline.run("remove all sales").await;

    assert_eq!(envelope.status, PipelineStatus::UnsafeQuery);
    assert_eq!(envelope.sql.as_deref(), Some("DELETE FROM sales"));
    assert_eq!(
        envelope.error.as_deref(),
        Some("Unsafe query: Only SELECT queries are allowed.")
    );
    assert!(envelope.result.is_none());
    assert!(envelope.chart.is_none());
    assert!(envelope.insights.is_none());
    assert_eq!(store.calls(), 0);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_execution_failure_skips_insights() {
    let (_dir, store) = fixture_store().await;
    let llm = scripted("SELECT revenue FROM sales");
    let pipeline = Pipeline::new(llm.clone(), Arc::new(store));

    let envelope = pipeline.run("revenue").await;

    assert_eq!(envelope.status, PipelineStatus::ExecutionFailure);
    assert!(envelope
        .error
        .unwrap()
        .contains("no such column: revenue"));
    assert!(envelope.result.is_none());
    assert!(envelope.insights.is_none());
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_empty_result_skips_chart_and_insights() {
    let (_dir, store) = fixture_store().await;
    let llm = scripted("SELECT product_name, price FROM sales WHERE quantity > 100");
    let pipeline = Pipeline::new(llm.clone(), Arc::new(store));

    let envelope = pipeline.run("bulk orders").await;

    assert_eq!(envelope.status, PipelineStatus::EmptyResult);
    let result = envelope.result.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.column_names(), vec!["product_name", "price"]);
    assert!(envelope.chart.is_none());
    assert!(envelope.insights.is_none());
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_insight_failure_keeps_table_and_chart() {
    let (_dir, store) = fixture_store().await;
    let llm = Arc::new(
        MockLlmClient::new()
            .with_response(SQL_MARKER, REVENUE_RESPONSE)
            .with_failure(INSIGHT_MARKER, "Resource has been exhausted"),
    );
    let pipeline = Pipeline::new(llm, Arc::new(store));

    let envelope = pipeline.run("total revenue by category").await;

    assert_eq!(envelope.status, PipelineStatus::InsightDegraded);
    assert_eq!(envelope.result.map(|r| r.row_count), Some(2));
    assert!(envelope.chart.is_some());
    assert_eq!(
        envelope.insights.as_deref(),
        Some("- Unable to generate insights: Resource has been exhausted")
    );
}

#[tokio::test]
async fn test_stacked_statement_cannot_modify_store() {
    let (_dir, store) = fixture_store().await;
    let store = Arc::new(store);
    let llm = scripted("SELECT 1; DROP TABLE sales");

    let strict = Pipeline::new(llm.clone(), store.clone());
    let envelope = strict.run("one").await;
    assert_eq!(envelope.status, PipelineStatus::UnsafeQuery);

    // Prefix-only validation lets it through; the read-only store still refuses the write.
    let lenient = Pipeline::new(llm, store.clone()).with_safety(SafetyConfig { strict: false });
    let envelope = lenient.run("one").await;
    assert_ne!(envelope.status, PipelineStatus::UnsafeQuery);

    let count = store
        .execute_query("SELECT COUNT(*) FROM sales")
        .await
        .unwrap();
    assert_eq!(count.rows[0][0], Value::Int(4));
}

#[tokio::test]
async fn test_sqlite_glob_query_runs_under_strict_validation() {
    let (_dir, store) = fixture_store().await;
    let llm = scripted("SELECT product_name FROM sales WHERE product_name GLOB 'L*'");
    let pipeline = Pipeline::new(llm, Arc::new(store));

    let envelope = pipeline.run("products starting with L").await;

    assert_eq!(envelope.status, PipelineStatus::Complete);
    let result = envelope.result.unwrap();
    assert_eq!(result.rows, vec![vec![Value::from("Laptop")]]);
}

#[tokio::test]
async fn test_envelope_json_shape() {
    let (_dir, store) = fixture_store().await;
    let pipeline = Pipeline::new(scripted(REVENUE_RESPONSE), Arc::new(store));

    let envelope = pipeline.run("total revenue by category").await;
    let json = serde_json::to_value(&envelope).unwrap();

    assert_eq!(json["status"], json!("Complete"));
    assert_eq!(json["sql"], json!(REVENUE_SQL));
    assert_eq!(json["chart"], json!({"mode": "bar", "x": "category", "y": "revenue"}));
    assert_eq!(json["error"], json!(null));
    assert_eq!(json["result"]["row_count"], json!(2));
}

#[tokio::test]
async fn test_insights_from_records() {
    let records: QueryRecords = serde_json::from_value(json!({
        "data": [
            {"category": "Electronics", "revenue": 90000.0},
            {"category": "Fashion", "revenue": 10000.0}
        ],
        "columns": ["category", "revenue"]
    }))
    .unwrap();
    let result = QueryResult::from_records(&records.data).unwrap();
    let llm = MockLlmClient::new();

    let insights = generate_insights(&llm, &result).await.unwrap();

    assert_eq!(insights.lines().count(), 3);
    let prompt = &llm.prompts()[0];
    assert!(prompt.contains("   category  revenue"));
    assert!(prompt.contains("Electronics  90000.0"));
}

#[tokio::test]
async fn test_insights_without_data() {
    let llm = MockLlmClient::new();

    let insights = generate_insights(&llm, &QueryResult::from_records(&[]).unwrap())
        .await
        .unwrap();

    assert_eq!(insights, NO_DATA_MESSAGE);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_generate_and_execute_stages() {
    let (_dir, store) = fixture_store().await;
    let pipeline = Pipeline::new(scripted(REVENUE_RESPONSE), Arc::new(store));

    let sql = pipeline.generate_sql("total revenue by category").await.unwrap();
    assert_eq!(sql, REVENUE_SQL);

    let outcome = pipeline.execute_sql(&sql).await.unwrap();
    let records = outcome.into_result().to_records();
    assert_eq!(records.columns, vec!["category", "revenue"]);
    assert_eq!(records.data.len(), 2);

    let fixed = QueryResult::with_data(
        vec![ColumnInfo::new("total", "REAL")],
        vec![vec![Value::Float(123.9)]],
    );
    assert_eq!(
        insightgen::query::select_chart(&fixed),
        ChartSelection::Scalar {
            column: "total".to_string(),
            value: 123
        }
    );
}
