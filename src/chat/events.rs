use tokio::sync::broadcast;
use tracing::trace;

use crate::data_connector::ConversationId;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// The conversation list or the conversation's messages changed
    Refresh { conversation_id: ConversationId },
}

/// Tells other views of the history to reload.
#[derive(Debug, Clone)]
pub struct HistoryNotifier {
    tx: broadcast::Sender<HistoryEvent>,
}

impl Default for HistoryNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers reached. Zero subscribers is fine.
    pub fn refresh(&self, conversation_id: &ConversationId) -> usize {
        let event = HistoryEvent::Refresh {
            conversation_id: conversation_id.clone(),
        };
        let reached = self.tx.send(event).unwrap_or(0);
        trace!(conversation_id = %conversation_id, reached, "history refresh broadcast");
        reached
    }
}
