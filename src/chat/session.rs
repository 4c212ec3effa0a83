// One chat turn: stream, decode, display, persist.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    chat::{
        display::DisplayEvent,
        events::HistoryNotifier,
        history::{load_history, HistoryMessage},
        stop::StopSignal,
    },
    client::{InferenceService, StreamAnalyzeRequest},
    config::ChatStreamConfig,
    data_connector::{
        ChatStorage, Conversation, ConversationId, ConversationStorageError, MessageId,
        MessageRole, MessageStorageError, NewConversation, NewMessage,
    },
    tagged_parser::{FinalizeReason, FinalizedRecord, TaggedStreamDecoder},
};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conversation storage error: {0}")]
    Conversation(#[from] ConversationStorageError),

    #[error("Message storage error: {0}")]
    Message(#[from] MessageStorageError),
}

/// A user message to answer
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// Existing conversation, or None to start a new one
    pub conversation_id: Option<ConversationId>,
    pub query: String,
    pub context_text: String,
    pub need_reasoning: bool,
}

impl TurnRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn in_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }
}

/// Outcome of a finished turn
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub conversation_id: ConversationId,
    /// True when this turn created the conversation
    pub created_conversation: bool,
    pub user_message_id: Option<MessageId>,
    pub assistant_message_id: Option<MessageId>,
    pub record: FinalizedRecord,
    /// Whether the assistant record reached storage
    pub persisted: bool,
}

/// Drives chat turns against an inference service and a history store.
#[derive(Clone)]
pub struct ChatSession {
    service: Arc<dyn InferenceService>,
    storage: ChatStorage,
    notifier: HistoryNotifier,
    config: ChatStreamConfig,
}

impl ChatSession {
    pub fn new(
        service: Arc<dyn InferenceService>,
        storage: ChatStorage,
        config: ChatStreamConfig,
    ) -> Self {
        Self {
            service,
            storage,
            notifier: HistoryNotifier::default(),
            config,
        }
    }

    pub fn with_notifier(mut self, notifier: HistoryNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn notifier(&self) -> &HistoryNotifier {
        &self.notifier
    }

    pub fn storage(&self) -> &ChatStorage {
        &self.storage
    }

    /// Answer one user message.
    ///
    /// Once the stream is opened this never fails: transport errors become an error
    /// record, storage failures are logged and reported through `persisted`, and a
    /// `DisplayEvent::Completed` is always sent.
    pub async fn send(
        &self,
        request: TurnRequest,
        display: mpsc::UnboundedSender<DisplayEvent>,
        mut stop: StopSignal,
    ) -> Result<TurnResult, ChatError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ChatError::InvalidRequest(
                "user query must not be empty".to_string(),
            ));
        }

        let (conversation, created_conversation) = self
            .ensure_conversation(request.conversation_id.clone(), &request.query)
            .await?;
        let conversation_id = conversation.id;

        let user_message_id = match self
            .storage
            .messages
            .create_message(NewMessage::user(
                conversation_id.clone(),
                request.query.clone(),
            ))
            .await
        {
            Ok(message) => Some(message.id),
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "failed to save user message");
                None
            }
        };

        let stream_request =
            StreamAnalyzeRequest::new(conversation_id.as_str(), request.query.clone())
                .with_context(request.context_text.clone())
                .with_reasoning(request.need_reasoning);

        let mut decoder = TaggedStreamDecoder::new();
        let mut last_snapshot = String::new();

        let reason = tokio::select! {
            biased;
            _ = stop.stopped() => {
                decoder.cancel();
                FinalizeReason::Cancelled
            }
            opened = self.service.stream_analyze(stream_request) => match opened {
                Err(e) => {
                    warn!(service = self.service.name(), error = %e, "failed to open stream");
                    FinalizeReason::Error(e.user_message())
                }
                Ok(mut stream) => loop {
                    tokio::select! {
                        biased;
                        _ = stop.stopped() => {
                            decoder.cancel();
                            break FinalizeReason::Cancelled;
                        }
                        next = stream.next() => match next {
                            Some(Ok(chunk)) => {
                                if let Some(update) = decoder.feed(&chunk) {
                                    if update.explanation != last_snapshot {
                                        last_snapshot = update.explanation.clone();
                                        let _ = display.send(DisplayEvent::Explanation {
                                            text: update.explanation,
                                        });
                                    }
                                }
                            }
                            Some(Err(e)) => {
                                warn!(service = self.service.name(), error = %e, "stream failed");
                                break FinalizeReason::Error(e.user_message());
                            }
                            None => break FinalizeReason::Normal,
                        }
                    }
                },
            }
        };
        // Any open stream is dropped by now, which aborts the in-flight read

        let record = decoder.finalize(reason);
        info!(
            conversation_id = %conversation_id,
            reason = record.reason().as_str(),
            chart_expected = record.chart_expected(),
            chart_ready = record.chart_ready(),
            "turn finished"
        );

        let assistant_message_id = self.persist_answer(&conversation_id, &record).await;
        let persisted = assistant_message_id.is_some();

        let _ = display.send(DisplayEvent::completed(&record));
        self.notifier.refresh(&conversation_id);

        Ok(TurnResult {
            conversation_id,
            created_conversation,
            user_message_id,
            assistant_message_id,
            record,
            persisted,
        })
    }

    async fn ensure_conversation(
        &self,
        conversation_id: Option<ConversationId>,
        first_message: &str,
    ) -> Result<(Conversation, bool), ChatError> {
        if let Some(id) = &conversation_id {
            if let Some(existing) = self.storage.conversations.get_conversation(id).await? {
                return Ok((existing, false));
            }
        }

        let conversation = self
            .storage
            .conversations
            .create_conversation(NewConversation {
                id: conversation_id,
                title: Some(self.config.conversation_title(first_message)),
            })
            .await?;
        debug!(conversation_id = %conversation.id, "conversation created");
        self.notifier.refresh(&conversation.id);
        Ok((conversation, true))
    }

    /// Best-effort write of the unpacked answer.
    async fn persist_answer(
        &self,
        conversation_id: &ConversationId,
        record: &FinalizedRecord,
    ) -> Option<MessageId> {
        let unpacked = record.unpacked();
        let chart_data = unpacked.chart_for_storage();
        match self
            .storage
            .messages
            .create_message(NewMessage::assistant(
                conversation_id.clone(),
                unpacked.explanation,
                chart_data,
            ))
            .await
        {
            Ok(message) => Some(message.id),
            Err(e) => {
                warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "failed to persist assistant message"
                );
                None
            }
        }
    }

    /// Messages of a conversation ready for display
    pub async fn load_history(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<HistoryMessage>, ChatError> {
        Ok(load_history(self.storage.messages.as_ref(), conversation_id).await?)
    }

    /// Edit a user message and drop everything that followed it.
    ///
    /// Returns the number of removed messages.
    pub async fn rewind_to(
        &self,
        message_id: &MessageId,
        new_content: &str,
    ) -> Result<usize, ChatError> {
        if new_content.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "edited message must not be empty".to_string(),
            ));
        }

        let message = self
            .storage
            .messages
            .get_message(message_id)
            .await?
            .ok_or_else(|| MessageStorageError::NotFound(message_id.to_string()))?;
        if message.role != MessageRole::User {
            return Err(ChatError::InvalidRequest(format!(
                "message {} is not a user message",
                message_id
            )));
        }

        self.storage
            .messages
            .update_content(message_id, new_content)
            .await?;
        let removed = self
            .storage
            .messages
            .delete_messages_after(&message.conversation_id, message_id)
            .await?;

        info!(
            conversation_id = %message.conversation_id,
            message_id = %message_id,
            removed,
            "conversation rewound"
        );
        self.notifier.refresh(&message.conversation_id);
        Ok(removed)
    }

    pub async fn rename_conversation(
        &self,
        conversation_id: &ConversationId,
        title: &str,
    ) -> Result<Conversation, ChatError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::InvalidRequest("title must not be empty".to_string()));
        }
        let conversation = self
            .storage
            .conversations
            .rename_conversation(conversation_id, title)
            .await?
            .ok_or_else(|| {
                ConversationStorageError::ConversationNotFound(conversation_id.to_string())
            })?;
        self.notifier.refresh(conversation_id);
        Ok(conversation)
    }

    /// Delete a conversation and its messages. Returns false if it did not exist.
    pub async fn delete_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<bool, ChatError> {
        let removed_messages = self
            .storage
            .messages
            .delete_conversation_messages(conversation_id)
            .await?;
        let existed = self
            .storage
            .conversations
            .delete_conversation(conversation_id)
            .await?;
        debug!(conversation_id = %conversation_id, removed_messages, existed, "conversation deleted");
        self.notifier.refresh(conversation_id);
        Ok(existed)
    }
}
