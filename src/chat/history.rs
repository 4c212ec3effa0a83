use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    data_connector::{
        ConversationId, ListParams, MessageId, MessageRole, MessageStorage,
        MessageStorageError, StoredMessage,
    },
    tagged_parser::{pack, unpack, UnpackedRecord, NO_CHART_SENTINEL},
};

/// A message as held in memory for display.
///
/// Assistant content is in packed form, user content is the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryMessage {
    pub fn from_stored(message: StoredMessage) -> Self {
        let content = match message.role {
            MessageRole::User => message.content,
            MessageRole::Assistant => {
                let saw_chart = message.chart_data.is_some();
                let chart = message.chart_data.as_deref().unwrap_or(NO_CHART_SENTINEL);
                pack(&message.content, chart, saw_chart).into_string()
            }
        };
        Self {
            id: message.id,
            role: message.role,
            content,
            created_at: message.created_at,
        }
    }

    /// Explanation and chart to render
    pub fn display(&self) -> UnpackedRecord {
        match self.role {
            MessageRole::Assistant => unpack(&self.content),
            MessageRole::User => UnpackedRecord {
                explanation: self.content.clone(),
                chart_data: NO_CHART_SENTINEL.to_string(),
            },
        }
    }
}

/// Load a conversation oldest first, re-packing assistant answers.
pub async fn load_history(
    storage: &dyn MessageStorage,
    conversation_id: &ConversationId,
) -> Result<Vec<HistoryMessage>, MessageStorageError> {
    let messages = storage
        .list_messages(conversation_id, ListParams::default())
        .await?;
    Ok(messages.into_iter().map(HistoryMessage::from_stored).collect())
}
