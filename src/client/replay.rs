use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;

use super::{ChunkStream, InferenceService, StreamAnalyzeRequest, TransportError};

const DEFAULT_CHUNK_SIZE: usize = 16;

/// Serves a captured response body in fixed-size chunks, regardless of the request.
#[derive(Debug, Clone)]
pub struct ReplayInferenceService {
    body: Bytes,
    chunk_size: usize,
}

impl ReplayInferenceService {
    pub fn from_bytes(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let body = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(body))
    }

    /// Chunk size in bytes. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn chunks(&self) -> Vec<Bytes> {
        let mut chunks = Vec::with_capacity(self.body.len() / self.chunk_size + 1);
        let mut offset = 0;
        while offset < self.body.len() {
            let end = (offset + self.chunk_size).min(self.body.len());
            chunks.push(self.body.slice(offset..end));
            offset = end;
        }
        chunks
    }
}

#[async_trait]
impl InferenceService for ReplayInferenceService {
    async fn stream_analyze(
        &self,
        request: StreamAnalyzeRequest,
    ) -> Result<ChunkStream, TransportError> {
        request.validate()?;
        Ok(futures::stream::iter(self.chunks().into_iter().map(Ok)).boxed())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_chunks_preserve_body() {
        let service = ReplayInferenceService::from_bytes("[EXPLANATION]\nhello").with_chunk_size(4);
        let stream = service
            .stream_analyze(StreamAnalyzeRequest::new("conv_1", "q"))
            .await
            .unwrap();
        let chunks: Vec<Bytes> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() <= 4));
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        assert_eq!(joined, b"[EXPLANATION]\nhello");
    }

    #[tokio::test]
    async fn test_replay_rejects_blank_query() {
        let service = ReplayInferenceService::from_bytes("x");
        let result = service
            .stream_analyze(StreamAnalyzeRequest::new("conv_1", " "))
            .await;
        assert!(matches!(result, Err(TransportError::Invalid(_))));
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let service = ReplayInferenceService::from_bytes("abc").with_chunk_size(0);
        assert_eq!(service.chunk_size(), 1);
    }
}
