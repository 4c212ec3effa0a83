use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tagged_stream_rs::{
    chat::{stop_channel, ChatSession, DisplayEvent, TurnRequest},
    client::{HttpInferenceClient, InferenceService, ReplayInferenceService},
    config::{ChatStreamConfig, ChatStreamConfigBuilder, ConfigResult, HistoryBackend},
    data_connector::{create_storage, ConversationId},
    logging::{init_logging, parse_level, LoggingConfig},
};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tagged-stream")]
#[command(about = "Stream one chat turn and decode its explanation and chart")]
#[command(long_about = r#"
Stream one chat turn and decode its explanation and chart

The explanation is rendered to stderr while it streams. Ctrl-C stops the turn and keeps
what arrived so far. The final record is printed to stdout as JSON.

Examples:
  # Against a running inference service
  tagged-stream --base-url http://127.0.0.1:8000 --query "plot monthly revenue"

  # Replay a captured response body in 5 byte chunks
  tagged-stream --replay captured.txt --chunk-size 5 --query "plot monthly revenue"
"#)]
struct CliArgs {
    /// Base URL of the inference service
    #[arg(long, env = "INFERENCE_API_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Path of the streaming endpoint
    #[arg(long, default_value = "/stream-analyze")]
    stream_path: String,

    /// Bearer token sent to the inference service
    #[arg(long, env = "INFERENCE_API_KEY")]
    api_key: Option<String>,

    /// User message to send
    #[arg(long)]
    query: String,

    /// Continue an existing conversation
    #[arg(long)]
    conversation_id: Option<String>,

    /// File whose content is sent as context text
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Ask the service for reasoning
    #[arg(long, default_value_t = false)]
    need_reasoning: bool,

    /// Replay a captured response body instead of calling the service
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Chunk size in bytes used when replaying
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Read timeout in seconds for the streaming request
    #[arg(long, default_value_t = 600)]
    request_timeout_secs: u64,

    /// History backend
    #[arg(long, default_value = "memory", value_parser = ["memory", "none"])]
    history_backend: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

impl CliArgs {
    fn to_chat_config(&self) -> ConfigResult<ChatStreamConfig> {
        let history_backend = self.history_backend.parse::<HistoryBackend>()?;

        ChatStreamConfigBuilder::new()
            .base_url(&self.base_url)
            .stream_path(&self.stream_path)
            .maybe_api_key(self.api_key.as_ref())
            .request_timeout_secs(self.request_timeout_secs)
            .history_backend(history_backend)
            .maybe_log_dir(self.log_dir.as_ref())
            .maybe_log_level(self.log_level.as_ref())
            .log_json(self.log_json)
            .build()
    }
}

async fn run(args: CliArgs, config: ChatStreamConfig) -> anyhow::Result<()> {
    let _log_guard = init_logging(LoggingConfig {
        level: parse_level(config.log_level.as_deref()),
        json_format: config.log_json,
        log_dir: config.log_dir.clone(),
        ..Default::default()
    });

    let service: Arc<dyn InferenceService> = match &args.replay {
        Some(path) => Arc::new(
            ReplayInferenceService::from_file(path)
                .await
                .with_context(|| format!("failed to read replay file {}", path.display()))?
                .with_chunk_size(args.chunk_size),
        ),
        None => Arc::new(HttpInferenceClient::new(&config.inference)?),
    };
    info!(service = service.name(), "inference service ready");

    let context_text = match &args.context_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read context file {}", path.display()))?,
        None => String::new(),
    };

    let storage = create_storage(&config.history_backend);
    let session = ChatSession::new(service, storage, config);

    let (stop_handle, stop_signal) = stop_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested");
            stop_handle.stop();
        }
    });

    let (display_tx, mut display_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(async move {
        let mut shown = 0usize;
        let mut stderr = std::io::stderr();
        while let Some(event) = display_rx.recv().await {
            match event {
                DisplayEvent::Explanation { text } => {
                    // Snapshots only ever extend, so print the new suffix
                    if let Some(delta) = text.get(shown..) {
                        let _ = write!(stderr, "{}", delta);
                        let _ = stderr.flush();
                    }
                    shown = text.len();
                }
                DisplayEvent::Completed { .. } => {
                    let _ = writeln!(stderr);
                }
            }
        }
    });

    let request = TurnRequest {
        conversation_id: args.conversation_id.clone().map(ConversationId::from),
        query: args.query.clone(),
        context_text,
        need_reasoning: args.need_reasoning,
    };
    let result = session.send(request, display_tx, stop_signal).await?;
    renderer.await?;

    let unpacked = result.record.unpacked();
    let output = serde_json::json!({
        "conversation_id": result.conversation_id,
        "explanation": unpacked.explanation,
        "chart_data": unpacked.chart_data,
        "chart_expected": result.record.chart_expected(),
        "chart_ready": result.record.chart_ready(),
        "reason": result.record.reason().as_str(),
        "persisted": result.persisted,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli_args = CliArgs::parse();

    let config = cli_args.to_chat_config()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(cli_args, config))
}
