//! Plain-text rendering of command results.

use insightgen::db::QueryResult;
use insightgen::llm::format_preview_table;
use insightgen::pipeline::ResponseEnvelope;
use insightgen::query::ChartSelection;

/// Renders a result as a full right-aligned table with a row count footer.
pub fn format_result(result: &QueryResult) -> String {
    let noun = if result.row_count == 1 { "row" } else { "rows" };
    format!(
        "{}\n({} {})",
        format_preview_table(result, result.row_count),
        result.row_count,
        noun
    )
}

pub fn format_chart(chart: &ChartSelection) -> String {
    match chart {
        ChartSelection::Bar { x, y } => format!("bar chart of {y} by {x}"),
        ChartSelection::Scalar { column, value } => format!("{column} = {value}"),
        ChartSelection::None => "no chart available".to_string(),
    }
}

/// Renders an envelope for the terminal.
pub fn format_envelope(envelope: &ResponseEnvelope) -> String {
    let mut sections = vec![format!("Question: {}", envelope.question)];

    if let Some(sql) = &envelope.sql {
        sections.push(format!("SQL:\n{sql}"));
    }

    sections.push(format!("Status: {}", envelope.status));

    if let Some(error) = &envelope.error {
        sections.push(format!("Error: {error}"));
    }

    if let Some(result) = &envelope.result {
        if result.is_empty() {
            sections.push("No rows matched.".to_string());
        } else {
            sections.push(format_result(result));
        }
    }

    if let Some(chart) = &envelope.chart {
        sections.push(format!("Chart: {}", format_chart(chart)));
    }

    if let Some(insights) = &envelope.insights {
        sections.push(format!("Insights:\n{insights}"));
    }

    sections.join("\n\n")
}
