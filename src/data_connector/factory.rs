// Storage backend selection.

use std::sync::Arc;

use tracing::info;

use super::{
    conversation_memory_store::MemoryConversationStorage,
    conversation_noop_store::NoOpConversationStorage,
    conversations::SharedConversationStorage, message_memory_store::MemoryMessageStorage,
    message_noop_store::NoOpMessageStorage, messages::SharedMessageStorage,
};
use crate::config::HistoryBackend;

/// Message and conversation stores backing a chat session
#[derive(Clone)]
pub struct ChatStorage {
    pub messages: SharedMessageStorage,
    pub conversations: SharedConversationStorage,
}

impl ChatStorage {
    pub fn new(messages: SharedMessageStorage, conversations: SharedConversationStorage) -> Self {
        Self {
            messages,
            conversations,
        }
    }
}

/// Create both storage backends for the configured history backend.
pub fn create_storage(backend: &HistoryBackend) -> ChatStorage {
    match backend {
        HistoryBackend::Memory => {
            info!("Initializing data connector: Memory");
            ChatStorage::new(
                Arc::new(MemoryMessageStorage::new()),
                Arc::new(MemoryConversationStorage::new()),
            )
        }
        HistoryBackend::None => {
            info!("Initializing data connector: None (no persistence)");
            ChatStorage::new(
                Arc::new(NoOpMessageStorage::new()),
                Arc::new(NoOpConversationStorage::new()),
            )
        }
    }
}
