//! Demo data for the `sales` relation.
//!
//! Creates the table from the schema descriptor and fills it with synthetic
//! orders spread over the last 90 days.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use tracing::info;

use crate::db::{Schema, SqliteStore};
use crate::error::{InsightError, Result};

/// Number of orders inserted when no count is given.
pub const DEFAULT_ORDER_COUNT: usize = 200;

/// How far back order dates reach.
const DATE_SPAN_DAYS: i64 = 90;

const PRODUCTS: &[(&str, &str)] = &[
    ("Laptop", "Electronics"),
    ("Phone", "Electronics"),
    ("Shoes", "Fashion"),
    ("Watch", "Accessories"),
    ("Bag", "Fashion"),
];

/// One synthetic order row.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoOrder {
    pub product_name: &'static str,
    pub category: &'static str,
    pub quantity: i64,
    pub price: f64,
    pub order_date: NaiveDate,
}

/// Generates `count` random orders dated between `today - 90 days` and `today`.
pub fn generate_orders<R: Rng + ?Sized>(rng: &mut R, count: usize, today: NaiveDate) -> Vec<DemoOrder> {
    let start = today - Duration::days(DATE_SPAN_DAYS);

    (0..count)
        .map(|_| {
            let (product_name, category) = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
            DemoOrder {
                product_name,
                category,
                quantity: rng.gen_range(1..=5),
                price: rng.gen_range(1000..=60000) as f64,
                order_date: start + Duration::days(rng.gen_range(0..=DATE_SPAN_DAYS)),
            }
        })
        .collect()
}

/// Creates the schema's tables and inserts `count` random orders.
///
/// Returns the number of rows inserted. All inserts run in one transaction.
pub async fn seed_demo_data(store: &SqliteStore, schema: &Schema, count: usize) -> Result<usize> {
    let today = chrono::Local::now().date_naive();
    let orders = generate_orders(&mut rand::thread_rng(), count, today);
    insert_orders(store, schema, &orders).await
}

/// Creates the schema's tables and inserts the given orders.
pub async fn insert_orders(store: &SqliteStore, schema: &Schema, orders: &[DemoOrder]) -> Result<usize> {
    let mut tx = store
        .pool()
        .begin()
        .await
        .map_err(|e| InsightError::connection(format!("Failed to begin transaction: {e}")))?;

    for statement in schema.create_table_statements() {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| InsightError::execution(format!("Failed to create table: {e}")))?;
    }

    for order in orders {
        sqlx::query(
            "INSERT INTO sales (product_name, category, quantity, price, order_date) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.product_name)
        .bind(order.category)
        .bind(order.quantity)
        .bind(order.price)
        .bind(order.order_date.format("%Y-%m-%d").to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| InsightError::execution(format!("Failed to insert order: {e}")))?;
    }

    tx.commit()
        .await
        .map_err(|e| InsightError::execution(format!("Failed to commit demo data: {e}")))?;

    info!("Inserted {} demo orders", orders.len());
    Ok(orders.len())
}
