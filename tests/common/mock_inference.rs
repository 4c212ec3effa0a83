use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{Json, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use tokio::sync::RwLock;

/// Configuration for mock inference behavior
#[derive(Clone, Debug)]
pub struct MockInferenceConfig {
    /// Body chunks sent in order, each flushed separately
    pub chunks: Vec<Vec<u8>>,
    /// Delay before each chunk
    pub chunk_delay_ms: u64,
    /// Status returned instead of streaming when not 200
    pub status: u16,
    /// Body returned together with a non-200 status
    pub error_body: String,
    /// Keep the connection open after the last chunk
    pub hang_after_chunks: bool,
    /// Bearer token the client must present
    pub expected_token: Option<String>,
}

impl Default for MockInferenceConfig {
    fn default() -> Self {
        Self {
            chunks: Vec::new(),
            chunk_delay_ms: 0,
            status: 200,
            error_body: String::new(),
            hang_after_chunks: false,
            expected_token: None,
        }
    }
}

impl MockInferenceConfig {
    pub fn with_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
struct MockState {
    config: MockInferenceConfig,
    requests: Arc<RwLock<Vec<serde_json::Value>>>,
}

/// Mock `stream-analyze` server for testing
pub struct MockInference {
    config: MockInferenceConfig,
    requests: Arc<RwLock<Vec<serde_json::Value>>>,
    shutdown_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockInference {
    pub fn new(config: MockInferenceConfig) -> Self {
        Self {
            config,
            requests: Arc::new(RwLock::new(Vec::new())),
            shutdown_handle: None,
            shutdown_tx: None,
        }
    }

    /// Start the server and return its base URL
    pub async fn start(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let state = MockState {
            config: self.config.clone(),
            requests: self.requests.clone(),
        };
        let app = Router::new()
            .route("/stream-analyze", post(stream_analyze_handler))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                eprintln!("Server error: {}", e);
            }
        });
        self.shutdown_handle = Some(handle);

        Ok(format!("http://127.0.0.1:{}", port))
    }

    /// Request bodies received so far
    pub async fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.read().await.clone()
    }

    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.shutdown_handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for MockInference {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.shutdown_handle.take() {
            handle.abort();
        }
    }
}

async fn stream_analyze_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.requests.write().await.push(body);
    let config = state.config;

    if let Some(token) = &config.expected_token {
        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(token.as_str()) {
            return (StatusCode::UNAUTHORIZED, "missing or invalid token").into_response();
        }
    }

    if config.status != 200 {
        let status = StatusCode::from_u16(config.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, config.error_body).into_response();
    }

    let delay = Duration::from_millis(config.chunk_delay_ms);
    let chunks = stream::iter(config.chunks).then(move |chunk| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok::<_, Infallible>(Bytes::from(chunk))
    });

    let body = if config.hang_after_chunks {
        Body::from_stream(chunks.chain(stream::pending()))
    } else {
        Body::from_stream(chunks)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/plain; charset=utf-8")
        .body(body)
        .unwrap()
}
