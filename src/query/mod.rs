//! Query execution and result shaping for InsightGen.
//!
//! This module isolates SQL execution and chart selection from the
//! pipeline that sequences them.

pub mod executor;
pub mod shaper;

pub use executor::{ExecutionOutcome, QueryExecutor};
pub use shaper::{select_chart, ChartSelection};
