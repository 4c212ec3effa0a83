use crate::tagged_parser::{FinalizeReason, FinalizedRecord};

/// Updates pushed to whatever renders the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// Explanation confirmed so far. Each snapshot extends the previous one.
    Explanation { text: String },
    /// The turn ended. Always sent exactly once per turn, whatever the outcome.
    Completed {
        explanation: String,
        chart_data: String,
        chart_expected: bool,
        chart_ready: bool,
        reason: FinalizeReason,
    },
}

impl DisplayEvent {
    pub fn completed(record: &FinalizedRecord) -> Self {
        let unpacked = record.unpacked();
        DisplayEvent::Completed {
            explanation: unpacked.explanation,
            chart_data: unpacked.chart_data,
            chart_expected: record.chart_expected(),
            chart_ready: record.chart_ready(),
            reason: record.reason().clone(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DisplayEvent::Completed { .. })
    }
}
