pub mod decoder;
pub mod markers;
pub mod record;
pub mod utf8;

pub use decoder::{
    DecoderMode, DisplayUpdate, FinalizeReason, FinalizedRecord, TaggedStreamDecoder,
};
pub use markers::{CHART_MARKER, EXPLANATION_MARKER, NO_CHART_SENTINEL};
pub use record::{pack, unpack, StreamRecord, UnpackedRecord};
pub use utf8::Utf8StreamDecoder;
