// Incremental decoder for tagged explanation/chart streams.
//
// The decoder owns all per-stream state. It is fed raw byte chunks as they arrive and is
// consumed by `finalize` once the stream ends, is cancelled, or fails.

use std::fmt;

use tracing::debug;

use crate::tagged_parser::{
    markers::{
        tail_start, CHART_MARKER, CHART_MARKER_HOLDBACK, EXPLANATION_MARKER,
        EXPLANATION_MARKER_HOLDBACK,
    },
    record::{pack, StreamRecord, UnpackedRecord},
    utf8::Utf8StreamDecoder,
};

/// Section of the stream the decoder is currently in.
///
/// Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderMode {
    AwaitingExplanationMarker,
    InExplanation,
    InChart,
}

impl fmt::Display for DecoderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecoderMode::AwaitingExplanationMarker => "awaiting_explanation_marker",
            DecoderMode::InExplanation => "in_explanation",
            DecoderMode::InChart => "in_chart",
        };
        f.write_str(name)
    }
}

/// Snapshot of the explanation streamed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUpdate {
    /// Confirmed explanation text, left-trimmed.
    pub explanation: String,
}

/// Why a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeReason {
    /// The stream closed normally.
    Normal,
    /// The user asked to stop. Partial output is kept.
    Cancelled,
    /// The stream failed. Carries the user-facing message that replaces the content.
    Error(String),
}

impl FinalizeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalizeReason::Normal => "normal",
            FinalizeReason::Cancelled => "cancelled",
            FinalizeReason::Error(_) => "error",
        }
    }
}

/// Result of finalizing a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedRecord {
    record: StreamRecord,
    reason: FinalizeReason,
    saw_chart_marker: bool,
}

impl FinalizedRecord {
    pub fn record(&self) -> &StreamRecord {
        &self.record
    }

    pub fn into_record(self) -> StreamRecord {
        self.record
    }

    pub fn reason(&self) -> &FinalizeReason {
        &self.reason
    }

    /// Whether `[CHART]` appeared in the stream, regardless of chart content.
    pub fn saw_chart_marker(&self) -> bool {
        self.saw_chart_marker
    }

    /// The display should reserve room for a chart.
    pub fn chart_expected(&self) -> bool {
        self.saw_chart_marker && !matches!(self.reason, FinalizeReason::Error(_))
    }

    /// A non-sentinel chart payload is available.
    pub fn chart_ready(&self) -> bool {
        self.record.unpack().has_chart()
    }

    pub fn unpacked(&self) -> UnpackedRecord {
        self.record.unpack()
    }
}

/// Streaming decoder for `[EXPLANATION]` / `[CHART]` tagged text.
#[derive(Debug, Clone)]
pub struct TaggedStreamDecoder {
    mode: DecoderMode,
    utf8: Utf8StreamDecoder,
    /// Decoded text not yet classified (may hold a split marker)
    residual: String,
    explanation: String,
    chart: String,
    saw_chart_marker: bool,
    cancelled: bool,
}

impl Default for TaggedStreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaggedStreamDecoder {
    pub fn new() -> Self {
        Self {
            mode: DecoderMode::AwaitingExplanationMarker,
            utf8: Utf8StreamDecoder::new(),
            residual: String::new(),
            explanation: String::new(),
            chart: String::new(),
            saw_chart_marker: false,
            cancelled: false,
        }
    }

    pub fn mode(&self) -> DecoderMode {
        self.mode
    }

    pub fn saw_chart_marker(&self) -> bool {
        self.saw_chart_marker
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Confirmed explanation text, untrimmed.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Confirmed chart text, untrimmed.
    pub fn chart(&self) -> &str {
        &self.chart
    }

    /// Text withheld because it may start a marker.
    pub fn residual(&self) -> &str {
        &self.residual
    }

    /// Mark the stream as stopped. Further chunks are ignored.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Consume the next chunk of the stream.
    ///
    /// Returns a snapshot of the explanation when the explanation section was processed.
    /// Chart text is only materialized at finalization.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<DisplayUpdate> {
        if self.cancelled {
            return None;
        }
        let text = self.utf8.decode(chunk);
        self.residual.push_str(&text);
        self.process_residual()
    }

    fn process_residual(&mut self) -> Option<DisplayUpdate> {
        let mut explanation_grew = false;

        loop {
            match self.mode {
                DecoderMode::AwaitingExplanationMarker => {
                    match self.residual.find(EXPLANATION_MARKER) {
                        Some(idx) => {
                            self.residual.drain(..idx + EXPLANATION_MARKER.len());
                            self.mode = DecoderMode::InExplanation;
                            debug!(discarded = idx, "explanation marker found");
                        }
                        None => {
                            // Nothing before the marker is meaningful
                            let keep_from =
                                tail_start(&self.residual, EXPLANATION_MARKER_HOLDBACK);
                            self.residual.drain(..keep_from);
                            return None;
                        }
                    }
                }
                DecoderMode::InExplanation => match self.residual.find(CHART_MARKER) {
                    Some(idx) => {
                        self.explanation.push_str(&self.residual[..idx]);
                        self.residual.drain(..idx + CHART_MARKER.len());
                        self.saw_chart_marker = true;
                        self.mode = DecoderMode::InChart;
                        explanation_grew |= idx > 0;
                        debug!(
                            explanation_len = self.explanation.len(),
                            "chart marker found"
                        );
                    }
                    None => {
                        let safe_end = tail_start(&self.residual, CHART_MARKER_HOLDBACK);
                        self.explanation.push_str(&self.residual[..safe_end]);
                        self.residual.drain(..safe_end);
                        return Some(self.snapshot());
                    }
                },
                DecoderMode::InChart => {
                    self.chart.push_str(&self.residual);
                    self.residual.clear();
                    return explanation_grew.then(|| self.snapshot());
                }
            }
        }
    }

    fn snapshot(&self) -> DisplayUpdate {
        DisplayUpdate {
            explanation: self.explanation.trim_start().to_string(),
        }
    }

    /// Flush withheld text and produce the packed record.
    ///
    /// Consuming `self` guarantees a stream is finalized at most once.
    pub fn finalize(mut self, reason: FinalizeReason) -> FinalizedRecord {
        let tail = self.utf8.finish();
        self.residual.push_str(&tail);

        if let FinalizeReason::Error(message) = &reason {
            debug!(
                discarded_explanation = self.explanation.len(),
                discarded_chart = self.chart.len(),
                "finalizing failed stream"
            );
            return FinalizedRecord {
                record: StreamRecord::error(message),
                saw_chart_marker: self.saw_chart_marker,
                reason,
            };
        }

        let residual = std::mem::take(&mut self.residual);
        match self.mode {
            // A stream that never sent the leading marker still shows what is left
            DecoderMode::AwaitingExplanationMarker | DecoderMode::InExplanation => {
                self.explanation.push_str(&residual)
            }
            DecoderMode::InChart => self.chart.push_str(&residual),
        }

        debug!(
            mode = %self.mode,
            reason = reason.as_str(),
            saw_chart_marker = self.saw_chart_marker,
            "finalizing stream"
        );

        FinalizedRecord {
            record: pack(
                self.explanation.trim_start(),
                self.chart.trim(),
                self.saw_chart_marker,
            ),
            saw_chart_marker: self.saw_chart_marker,
            reason,
        }
    }
}
