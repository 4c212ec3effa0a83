use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{
    conversations::ConversationId,
    messages::{
        ListParams, MessageId, MessageStorage, MessageStorageError, NewMessage, Result,
        SortOrder, StoredMessage,
    },
};

#[derive(Default)]
struct Inner {
    messages: HashMap<MessageId, StoredMessage>,
    // conversation -> message ids in creation order
    order: HashMap<ConversationId, Vec<MessageId>>,
}

/// In-memory message storage used for development and tests
#[derive(Default, Clone)]
pub struct MemoryMessageStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryMessageStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStorage for MemoryMessageStorage {
    async fn create_message(&self, message: NewMessage) -> Result<StoredMessage> {
        let stored = StoredMessage {
            id: message.id.unwrap_or_default(),
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content,
            chart_data: message.chart_data,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write();
        if inner.messages.contains_key(&stored.id) {
            return Err(MessageStorageError::StorageError(format!(
                "duplicate message id: {}",
                stored.id
            )));
        }
        inner
            .order
            .entry(stored.conversation_id.clone())
            .or_default()
            .push(stored.id.clone());
        inner.messages.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<StoredMessage>> {
        Ok(self.inner.read().messages.get(id).cloned())
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        params: ListParams,
    ) -> Result<Vec<StoredMessage>> {
        let inner = self.inner.read();
        let Some(ids) = inner.order.get(conversation_id) else {
            return Ok(Vec::new());
        };

        let ordered: Box<dyn Iterator<Item = &MessageId>> = match params.order {
            SortOrder::Asc => Box::new(ids.iter()),
            SortOrder::Desc => Box::new(ids.iter().rev()),
        };
        let results = ordered
            .filter_map(|id| inner.messages.get(id).cloned())
            .take(params.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(results)
    }

    async fn update_content(
        &self,
        id: &MessageId,
        content: &str,
    ) -> Result<Option<StoredMessage>> {
        let mut inner = self.inner.write();
        if let Some(message) = inner.messages.get_mut(id) {
            message.content = content.to_string();
            return Ok(Some(message.clone()));
        }
        Ok(None)
    }

    async fn delete_messages_after(
        &self,
        conversation_id: &ConversationId,
        anchor: &MessageId,
    ) -> Result<usize> {
        let mut inner = self.inner.write();
        let Some(ids) = inner.order.get_mut(conversation_id) else {
            return Ok(0);
        };
        let Some(pos) = ids.iter().position(|id| id == anchor) else {
            return Err(MessageStorageError::NotFound(anchor.to_string()));
        };

        let removed: Vec<MessageId> = ids.split_off(pos + 1);
        for id in &removed {
            inner.messages.remove(id);
        }
        Ok(removed.len())
    }

    async fn delete_conversation_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<usize> {
        let mut inner = self.inner.write();
        let removed = inner.order.remove(conversation_id).unwrap_or_default();
        for id in &removed {
            inner.messages.remove(id);
        }
        Ok(removed.len())
    }
}
