// Packed and unpacked forms of an assistant answer.
//
// The packed form is what travels on the wire and what the display buffer holds while a
// stream is in flight. The unpacked form is what gets persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tagged_parser::markers::{CHART_MARKER, EXPLANATION_MARKER, NO_CHART_SENTINEL};

/// A packed record: `"[EXPLANATION]\n" <explanation> ["\n[CHART]\n" <chart>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamRecord(String);

impl StreamRecord {
    /// Wrap an already packed string (e.g. a legacy row) without validation.
    pub fn from_packed(packed: impl Into<String>) -> Self {
        Self(packed.into())
    }

    /// Explanation-only record carrying a user-facing error message.
    pub fn error(message: &str) -> Self {
        Self(format!("{}\n{}", EXPLANATION_MARKER, message))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Unpack into explanation and chart fields.
    pub fn unpack(&self) -> UnpackedRecord {
        unpack(&self.0)
    }
}

impl fmt::Display for StreamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StreamRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Explanation and chart as separate fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackedRecord {
    pub explanation: String,
    /// Opaque chart description, or the `NONE` sentinel.
    pub chart_data: String,
}

impl UnpackedRecord {
    pub fn has_chart(&self) -> bool {
        self.chart_data != NO_CHART_SENTINEL
    }

    /// Chart column as stored: absent when there is no chart.
    pub fn chart_for_storage(&self) -> Option<String> {
        if self.has_chart() {
            Some(self.chart_data.clone())
        } else {
            None
        }
    }
}

/// Pack explanation and chart text into a single record.
///
/// The chart section is always written. It carries `NONE` unless a chart marker was seen
/// and the chart text is non-blank.
pub fn pack(explanation: &str, chart_text: &str, saw_chart: bool) -> StreamRecord {
    let chart = if saw_chart && !chart_text.trim().is_empty() {
        chart_text
    } else {
        NO_CHART_SENTINEL
    };

    let mut packed = String::with_capacity(
        EXPLANATION_MARKER.len() + explanation.len() + CHART_MARKER.len() + chart.len() + 3,
    );
    packed.push_str(EXPLANATION_MARKER);
    packed.push('\n');
    packed.push_str(explanation);
    packed.push('\n');
    packed.push_str(CHART_MARKER);
    packed.push('\n');
    packed.push_str(chart);
    StreamRecord(packed)
}

/// Unpack any string into explanation and chart fields.
///
/// Input that does not follow the packed grammar degrades to "whole string is the
/// explanation".
pub fn unpack(record: &str) -> UnpackedRecord {
    let text = match record.strip_prefix(EXPLANATION_MARKER) {
        Some(rest) => rest.trim_start(),
        None => record,
    };

    match text.find(CHART_MARKER) {
        None => UnpackedRecord {
            explanation: text.trim().to_string(),
            chart_data: NO_CHART_SENTINEL.to_string(),
        },
        Some(idx) => {
            let chart = text[idx + CHART_MARKER.len()..].trim();
            UnpackedRecord {
                explanation: text[..idx].trim().to_string(),
                chart_data: if chart.is_empty() {
                    NO_CHART_SENTINEL.to_string()
                } else {
                    chart.to_string()
                },
            }
        }
    }
}
