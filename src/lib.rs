pub mod chat;
pub mod client;
pub mod config;
pub mod data_connector;
pub mod logging;
pub mod tagged_parser;

pub use chat::{
    ChatError, ChatSession, DisplayEvent, StopHandle, StopSignal, TurnRequest, TurnResult,
};
pub use client::{HttpInferenceClient, InferenceService, ReplayInferenceService, TransportError};
pub use config::{ChatStreamConfig, ChatStreamConfigBuilder, ConfigError, ConfigResult};
pub use tagged_parser::{
    pack, unpack, FinalizeReason, FinalizedRecord, StreamRecord, TaggedStreamDecoder,
    UnpackedRecord,
};
