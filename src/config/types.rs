use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Main chat stream configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatStreamConfig {
    /// Inference service connection
    pub inference: InferenceConfig,
    /// History backend configuration (memory or none, default: memory)
    #[serde(default = "default_history_backend")]
    pub history_backend: HistoryBackend,
    /// Maximum characters kept from the first user message when titling a conversation
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
    /// Title used when the first user message is blank
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Log directory (None = stderr only)
    pub log_dir: Option<String>,
    /// Log level (None = info)
    pub log_level: Option<String>,
    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_history_backend() -> HistoryBackend {
    HistoryBackend::Memory
}

fn default_title_max_chars() -> usize {
    80
}

fn default_title() -> String {
    "Untitled chat".to_string()
}

/// History backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// In-memory storage (default)
    Memory,
    /// No history storage
    None,
}

impl std::str::FromStr for HistoryBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(HistoryBackend::Memory),
            "none" => Ok(HistoryBackend::None),
            _ => Err(ConfigError::invalid(
                "history_backend",
                s,
                "Must be one of: memory, none",
            )),
        }
    }
}

/// Inference service connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceConfig {
    /// Base URL of the inference service (e.g. http://127.0.0.1:8000)
    pub base_url: String,
    /// Path of the streaming analysis endpoint
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Longest silence in seconds tolerated while reading the streamed body
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

fn default_stream_path() -> String {
    "/stream-analyze".to_string()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            stream_path: default_stream_path(),
            api_key: None,
            request_timeout_secs: 600,
            connect_timeout_secs: 10,
        }
    }
}

impl InferenceConfig {
    /// Full URL of the streaming endpoint
    pub fn stream_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.stream_path.starts_with('/') {
            format!("{}{}", base, self.stream_path)
        } else {
            format!("{}/{}", base, self.stream_path)
        }
    }
}

impl Default for ChatStreamConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            history_backend: default_history_backend(),
            title_max_chars: default_title_max_chars(),
            default_title: default_title(),
            log_dir: None,
            log_level: None,
            log_json: false,
        }
    }
}

impl ChatStreamConfig {
    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        crate::config::validation::ConfigValidator::validate(self)
    }

    /// Title for a new conversation derived from its first user message
    pub fn conversation_title(&self, first_message: &str) -> String {
        let title: String = first_message
            .trim()
            .chars()
            .take(self.title_max_chars)
            .collect();
        let title = title.trim_end();
        if title.is_empty() {
            self.default_title.clone()
        } else {
            title.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_stream_config_default() {
        let config = ChatStreamConfig::default();
        assert_eq!(config.history_backend, HistoryBackend::Memory);
        assert_eq!(config.title_max_chars, 80);
        assert_eq!(config.default_title, "Untitled chat");
        assert_eq!(config.inference.stream_path, "/stream-analyze");
        assert!(config.log_dir.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_stream_url_joins_slashes() {
        let mut inference = InferenceConfig {
            base_url: "http://host:8000/".to_string(),
            ..Default::default()
        };
        assert_eq!(inference.stream_url(), "http://host:8000/stream-analyze");

        inference.stream_path = "v1/analyze".to_string();
        assert_eq!(inference.stream_url(), "http://host:8000/v1/analyze");
    }

    #[test]
    fn test_conversation_title() {
        let config = ChatStreamConfig {
            title_max_chars: 5,
            ..Default::default()
        };
        assert_eq!(config.conversation_title("  hello world "), "hello");
        assert_eq!(config.conversation_title("ab   cd"), "ab");
        assert_eq!(config.conversation_title("   "), "Untitled chat");
        assert_eq!(config.conversation_title("销售数据图表分析"), "销售数据图");
    }

    #[test]
    fn test_history_backend_serialization() {
        let json = serde_json::to_string(&HistoryBackend::None).unwrap();
        assert_eq!(json, "\"none\"");
        let parsed: HistoryBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(parsed, HistoryBackend::Memory);
        assert_eq!("NONE".parse::<HistoryBackend>().ok(), Some(HistoryBackend::None));
        assert!("oracle".parse::<HistoryBackend>().is_err());
    }

    #[test]
    fn test_unknown_history_backend_is_invalid_value() {
        match "oracle".parse::<HistoryBackend>() {
            Err(ConfigError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "history_backend");
                assert_eq!(value, "oracle");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let json = r#"{
            "inference": {
                "base_url": "http://localhost:9000",
                "request_timeout_secs": 30,
                "connect_timeout_secs": 5
            },
            "log_dir": null,
            "log_level": "debug"
        }"#;
        let config: ChatStreamConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.inference.stream_path, "/stream-analyze");
        assert_eq!(config.history_backend, HistoryBackend::Memory);
        assert_eq!(config.title_max_chars, 80);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }
}
