//! Inference service collaborator.
//!
//! The chat session only needs a stream of raw body chunks for a request. The HTTP client
//! talks to the real service; the replay service serves a captured body for offline runs.

pub mod http;
pub mod replay;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use http::HttpInferenceClient;
pub use replay::ReplayInferenceService;

/// Raw body chunks of one streamed answer
pub type ChunkStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Shown when the service could not be reached
pub const REQUEST_FAILED_MESSAGE: &str =
    "Request to the server failed, please try again later.";

/// Shown when the answer stream broke off
pub const STREAM_INTERRUPTED_MESSAGE: &str =
    "The answer was interrupted, please try again later.";

/// Errors raised while opening or reading an inference stream.
///
/// Display carries the technical detail for logs. `user_message` is what replaces the
/// answer in the conversation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API Error {status}")]
    Status { status: u16, body: String },

    #[error("Stream error: {0}")]
    Body(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl TransportError {
    /// Human-readable text for the error record
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Request(_) | TransportError::Io(_) => {
                REQUEST_FAILED_MESSAGE.to_string()
            }
            TransportError::Body(_) => STREAM_INTERRUPTED_MESSAGE.to_string(),
            TransportError::Status { .. } | TransportError::Invalid(_) => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Body of a `stream-analyze` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamAnalyzeRequest {
    pub conversation_id: String,
    pub user_query: String,
    #[serde(default)]
    pub context_text: String,
    #[serde(default)]
    pub need_reasoning: bool,
}

impl StreamAnalyzeRequest {
    pub fn new(conversation_id: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_query: user_query.into(),
            context_text: String::new(),
            need_reasoning: false,
        }
    }

    pub fn with_context(mut self, context_text: impl Into<String>) -> Self {
        self.context_text = context_text.into();
        self
    }

    pub fn with_reasoning(mut self, need_reasoning: bool) -> Self {
        self.need_reasoning = need_reasoning;
        self
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.user_query.trim().is_empty() {
            return Err(TransportError::Invalid("user query must not be empty".to_string()));
        }
        if self.conversation_id.trim().is_empty() {
            return Err(TransportError::Invalid(
                "conversation id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A service that answers a query with a tagged byte stream
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn stream_analyze(
        &self,
        request: StreamAnalyzeRequest,
    ) -> Result<ChunkStream, TransportError>;

    /// Service name used in logs
    fn name(&self) -> &str;
}
