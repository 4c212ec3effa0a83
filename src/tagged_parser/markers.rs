//! Inline markers of the tagged stream format.
//!
//! All literals are matched byte-for-byte and are case-sensitive.

/// Opens the explanation section. Everything before it is noise.
pub const EXPLANATION_MARKER: &str = "[EXPLANATION]";

/// Separates the explanation from the chart payload.
pub const CHART_MARKER: &str = "[CHART]";

/// Chart payload meaning "no chart".
pub const NO_CHART_SENTINEL: &str = "NONE";

/// Characters held back while waiting for a split `[EXPLANATION]`.
pub const EXPLANATION_MARKER_HOLDBACK: usize = EXPLANATION_MARKER.len() - 1;

/// Characters held back while waiting for a split `[CHART]`.
pub const CHART_MARKER_HOLDBACK: usize = CHART_MARKER.len() - 1;

/// Byte index where the last `keep` characters of `text` begin.
///
/// Always lands on a char boundary so a withheld tail never splits a character.
pub(crate) fn tail_start(text: &str, keep: usize) -> usize {
    if keep == 0 {
        return text.len();
    }
    text.char_indices()
        .rev()
        .nth(keep - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}
