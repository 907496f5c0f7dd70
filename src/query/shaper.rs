//! Chart selection for query results.

use serde::Serialize;

use crate::db::QueryResult;

/// How a result set should be visualized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChartSelection {
    /// Categorical bar chart: `x` is the category axis, `y` the value axis.
    Bar { x: String, y: String },
    /// A single metric, shown as an integer.
    Scalar { column: String, value: i64 },
    /// No chart available.
    None,
}

/// Picks a chart for a non-empty result.
///
/// With both kinds of column present the first non-numeric column is the
/// category axis and the first numeric column the value axis. A result with
/// only numeric columns is a scalar taken from the first row of the first
/// column, truncated toward zero. Anything else gets no chart.
pub fn select_chart(result: &QueryResult) -> ChartSelection {
    let (numeric, other): (Vec<usize>, Vec<usize>) =
        (0..result.columns.len()).partition(|&i| result.is_numeric_column(i));

    match (numeric.first(), other.first()) {
        (Some(&y), Some(&x)) => ChartSelection::Bar {
            x: result.columns[x].name.clone(),
            y: result.columns[y].name.clone(),
        },
        (Some(&column), None) => result
            .rows
            .first()
            .and_then(|row| row.get(column))
            .and_then(|value| value.as_i64_truncated())
            .map_or(ChartSelection::None, |value| ChartSelection::Scalar {
                column: result.columns[column].name.clone(),
                value,
            }),
        _ => ChartSelection::None,
    }
}
