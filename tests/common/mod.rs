// These modules are used by several integration tests
#![allow(dead_code)]

pub mod mock_inference;

use std::sync::Arc;

use tagged_stream_rs::{
    chat::ChatSession,
    client::InferenceService,
    config::{ChatStreamConfig, ChatStreamConfigBuilder, HistoryBackend},
    data_connector::{create_storage, ChatStorage},
};

/// Config pointing at the given base URL with in-memory history
pub fn test_config(base_url: &str) -> ChatStreamConfig {
    ChatStreamConfigBuilder::new()
        .base_url(base_url)
        .api_key("test-token")
        .request_timeout_secs(30)
        .connect_timeout_secs(2)
        .memory_history()
        .build()
        .expect("test config must be valid")
}

/// Session over an arbitrary service with fresh in-memory storage
pub fn session_with(service: Arc<dyn InferenceService>) -> (ChatSession, ChatStorage) {
    let storage = create_storage(&HistoryBackend::Memory);
    let session = ChatSession::new(
        service,
        storage.clone(),
        test_config("http://127.0.0.1:8000"),
    );
    (session, storage)
}
