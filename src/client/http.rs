use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use tracing::{debug, warn};

use super::{ChunkStream, InferenceService, StreamAnalyzeRequest, TransportError};
use crate::config::InferenceConfig;

/// HTTP client for the `stream-analyze` endpoint
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, TransportError> {
        // No overall timeout: a stream may legitimately run for minutes
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.stream_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InferenceService for HttpInferenceClient {
    async fn stream_analyze(
        &self,
        request: StreamAnalyzeRequest,
    ) -> Result<ChunkStream, TransportError> {
        request.validate()?;

        let mut req_builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            req_builder = req_builder.bearer_auth(key);
        }

        let res = req_builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(
                url = %self.url,
                status = status.as_u16(),
                "inference service rejected request"
            );
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(url = %self.url, conversation_id = %request.conversation_id, "stream opened");
        Ok(res.bytes_stream().map_err(TransportError::from).boxed())
    }

    fn name(&self) -> &str {
        "http"
    }
}
