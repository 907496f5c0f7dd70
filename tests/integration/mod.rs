//! Integration tests for InsightGen.

pub mod pipeline_test;
pub mod store_test;

use chrono::NaiveDate;
use insightgen::config::StoreConfig;
use insightgen::db::seed::{insert_orders, DemoOrder};
use insightgen::db::{QueryStore, Schema, SqliteStore};
use tempfile::TempDir;

fn order(
    product_name: &'static str,
    category: &'static str,
    quantity: i64,
    price: f64,
    day: u32,
) -> DemoOrder {
    DemoOrder {
        product_name,
        category,
        quantity,
        price,
        order_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
    }
}

/// Four orders: Electronics revenue 90000, Fashion revenue 10000.
pub fn fixture_orders() -> Vec<DemoOrder> {
    vec![
        order("Laptop", "Electronics", 1, 50000.0, 3),
        order("Phone", "Electronics", 2, 20000.0, 9),
        order("Shoes", "Fashion", 3, 2000.0, 14),
        order("Bag", "Fashion", 1, 4000.0, 21),
    ]
}

/// Writes the fixture orders to a fresh database file and reopens it read-only.
///
/// Keep the returned directory alive for as long as the store is used.
pub async fn fixture_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("sales.db"));

    let writer = SqliteStore::open_writable(&config).await.unwrap();
    insert_orders(&writer, &Schema::sales(), &fixture_orders())
        .await
        .unwrap();
    writer.close().await.unwrap();

    let store = SqliteStore::open(&config).await.unwrap();
    (dir, store)
}
