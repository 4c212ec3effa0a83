use async_trait::async_trait;
use chrono::Utc;

use super::{
    conversations::ConversationId,
    messages::{ListParams, MessageId, MessageStorage, NewMessage, Result, StoredMessage},
};

/// No-op implementation that accepts writes without persisting them
#[derive(Default, Debug, Clone)]
pub struct NoOpMessageStorage;

impl NoOpMessageStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageStorage for NoOpMessageStorage {
    async fn create_message(&self, message: NewMessage) -> Result<StoredMessage> {
        Ok(StoredMessage {
            id: message.id.unwrap_or_default(),
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content,
            chart_data: message.chart_data,
            created_at: Utc::now(),
        })
    }

    async fn get_message(&self, _id: &MessageId) -> Result<Option<StoredMessage>> {
        Ok(None)
    }

    async fn list_messages(
        &self,
        _conversation_id: &ConversationId,
        _params: ListParams,
    ) -> Result<Vec<StoredMessage>> {
        Ok(Vec::new())
    }

    async fn update_content(
        &self,
        _id: &MessageId,
        _content: &str,
    ) -> Result<Option<StoredMessage>> {
        Ok(None)
    }

    async fn delete_messages_after(
        &self,
        _conversation_id: &ConversationId,
        _anchor: &MessageId,
    ) -> Result<usize> {
        Ok(0)
    }

    async fn delete_conversation_messages(
        &self,
        _conversation_id: &ConversationId,
    ) -> Result<usize> {
        Ok(0)
    }
}
