use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::conversations::ConversationId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        // 50 hex characters after the prefix
        let mut rng = rand::rng();
        let mut bytes = [0u8; 25];
        rng.fill_bytes(&mut bytes);
        let hex_string: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Self(format!("msg_{}", hex_string))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl Display for MessageRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => f.write_str("user"),
            MessageRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// A persisted chat message.
///
/// Assistant rows hold the unpacked form: the explanation in `content` and the chart
/// description in `chart_data` (absent when the answer has no chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<String>,
}

impl NewMessage {
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            id: None,
            conversation_id,
            role: MessageRole::User,
            content: content.into(),
            chart_data: None,
        }
    }

    pub fn assistant(
        conversation_id: ConversationId,
        explanation: impl Into<String>,
        chart_data: Option<String>,
    ) -> Self {
        Self {
            id: None,
            conversation_id,
            role: MessageRole::Assistant,
            content: explanation.into(),
            chart_data,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    /// Maximum number of messages (None = all)
    pub limit: Option<usize>,
    pub order: SortOrder,
}

pub type Result<T> = std::result::Result<T, MessageStorageError>;

#[derive(Debug, thiserror::Error)]
pub enum MessageStorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait MessageStorage: Send + Sync + 'static {
    async fn create_message(&self, message: NewMessage) -> Result<StoredMessage>;

    async fn get_message(&self, id: &MessageId) -> Result<Option<StoredMessage>>;

    /// Messages of a conversation in creation order
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        params: ListParams,
    ) -> Result<Vec<StoredMessage>>;

    /// Replace the content of a message. Returns None when it does not exist.
    async fn update_content(&self, id: &MessageId, content: &str)
        -> Result<Option<StoredMessage>>;

    /// Delete every message of the conversation created after `anchor`.
    /// Returns the number of deleted messages.
    async fn delete_messages_after(
        &self,
        conversation_id: &ConversationId,
        anchor: &MessageId,
    ) -> Result<usize>;

    /// Delete all messages of a conversation
    async fn delete_conversation_messages(&self, conversation_id: &ConversationId)
        -> Result<usize>;
}

pub type SharedMessageStorage = Arc<dyn MessageStorage>;
