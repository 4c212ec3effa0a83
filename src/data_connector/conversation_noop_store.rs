use async_trait::async_trait;

use super::conversations::{
    Conversation, ConversationId, ConversationStorage, NewConversation, Result,
};

/// No-op implementation that synthesizes conversations without persistence
#[derive(Default, Debug, Clone)]
pub struct NoOpConversationStorage;

impl NoOpConversationStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConversationStorage for NoOpConversationStorage {
    async fn create_conversation(&self, input: NewConversation) -> Result<Conversation> {
        Ok(Conversation::new(input))
    }

    async fn get_conversation(&self, _id: &ConversationId) -> Result<Option<Conversation>> {
        Ok(None)
    }

    async fn rename_conversation(
        &self,
        _id: &ConversationId,
        _title: &str,
    ) -> Result<Option<Conversation>> {
        Ok(None)
    }

    async fn delete_conversation(&self, _id: &ConversationId) -> Result<bool> {
        Ok(false)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        Ok(Vec::new())
    }
}
