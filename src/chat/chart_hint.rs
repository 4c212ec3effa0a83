// Heuristics deciding when the display reserves room for a chart.

use crate::{
    chat::history::HistoryMessage,
    data_connector::{MessageId, MessageRole},
    tagged_parser::NO_CHART_SENTINEL,
};

const CHART_KEYWORDS: &[&str] = &[
    "plot",
    "line plot",
    "bar chart",
    "scatter",
    "pie",
    "chart",
    "graph",
    "visualize",
    "visualise",
    "echarts",
];

/// Whether a user message reads like a request for a chart.
pub fn looks_like_chart_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CHART_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Text of the closest user message before the given assistant message.
pub fn previous_user_text<'a>(
    messages: &'a [HistoryMessage],
    assistant_id: &MessageId,
) -> Option<&'a str> {
    let idx = messages.iter().position(|m| &m.id == assistant_id)?;
    messages[..idx]
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
}

/// A chart is expected but not here yet, and some explanation is already visible.
pub fn show_chart_placeholder(expected: bool, chart_data: Option<&str>, explanation: &str) -> bool {
    let missing = match chart_data {
        None => true,
        Some(chart) => chart.is_empty() || chart == NO_CHART_SENTINEL,
    };
    expected && missing && !explanation.trim().is_empty()
}

/// There is real chart data to render.
pub fn show_chart(chart_data: Option<&str>) -> bool {
    matches!(chart_data, Some(chart) if !chart.trim().is_empty() && chart != NO_CHART_SENTINEL)
}
