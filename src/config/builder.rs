use super::{ChatStreamConfig, ConfigResult, HistoryBackend, InferenceConfig};

/// Builder for ChatStreamConfig that wraps the config itself
#[derive(Debug, Clone, Default)]
pub struct ChatStreamConfigBuilder {
    config: ChatStreamConfig,
}

impl ChatStreamConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from an existing configuration (takes ownership)
    pub fn from_config(config: ChatStreamConfig) -> Self {
        Self { config }
    }

    // ==================== Inference Setters ====================

    pub fn inference(mut self, inference: InferenceConfig) -> Self {
        self.config.inference = inference;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.inference.base_url = base_url.into();
        self
    }

    pub fn stream_path(mut self, stream_path: impl Into<String>) -> Self {
        self.config.inference.stream_path = stream_path.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.inference.api_key = Some(api_key.into());
        self
    }

    pub fn maybe_api_key(mut self, api_key: Option<impl Into<String>>) -> Self {
        self.config.inference.api_key = api_key.map(|k| k.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.inference.request_timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.inference.connect_timeout_secs = secs;
        self
    }

    // ==================== History Setters ====================

    pub fn history_backend(mut self, backend: HistoryBackend) -> Self {
        self.config.history_backend = backend;
        self
    }

    pub fn memory_history(self) -> Self {
        self.history_backend(HistoryBackend::Memory)
    }

    pub fn no_history(self) -> Self {
        self.history_backend(HistoryBackend::None)
    }

    pub fn title_max_chars(mut self, max_chars: usize) -> Self {
        self.config.title_max_chars = max_chars;
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.config.default_title = title.into();
        self
    }

    // ==================== Logging Setters ====================

    pub fn log_dir(mut self, log_dir: impl Into<String>) -> Self {
        self.config.log_dir = Some(log_dir.into());
        self
    }

    pub fn maybe_log_dir(mut self, log_dir: Option<impl Into<String>>) -> Self {
        self.config.log_dir = log_dir.map(|d| d.into());
        self
    }

    pub fn log_level(mut self, log_level: impl Into<String>) -> Self {
        self.config.log_level = Some(log_level.into());
        self
    }

    pub fn maybe_log_level(mut self, log_level: Option<impl Into<String>>) -> Self {
        self.config.log_level = log_level.map(|l| l.into());
        self
    }

    pub fn log_json(mut self, enable: bool) -> Self {
        self.config.log_json = enable;
        self
    }

    // ==================== Build Methods ====================

    /// Build the config without validation
    pub fn build_unchecked(self) -> ChatStreamConfig {
        self.config
    }

    /// Build the config with validation
    pub fn build(self) -> ConfigResult<ChatStreamConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl From<ChatStreamConfigBuilder> for ChatStreamConfig {
    fn from(builder: ChatStreamConfigBuilder) -> Self {
        builder.build_unchecked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let config = ChatStreamConfigBuilder::new()
            .base_url("https://inference.example.com")
            .stream_path("/v2/stream")
            .api_key("secret")
            .request_timeout_secs(30)
            .connect_timeout_secs(3)
            .no_history()
            .title_max_chars(40)
            .default_title("New Chat")
            .log_level("debug")
            .log_json(true)
            .build()
            .unwrap();

        assert_eq!(config.inference.base_url, "https://inference.example.com");
        assert_eq!(
            config.inference.stream_url(),
            "https://inference.example.com/v2/stream"
        );
        assert_eq!(config.inference.api_key.as_deref(), Some("secret"));
        assert_eq!(config.inference.request_timeout_secs, 30);
        assert_eq!(config.history_backend, HistoryBackend::None);
        assert_eq!(config.title_max_chars, 40);
        assert_eq!(config.default_title, "New Chat");
        assert!(config.log_json);
    }

    #[test]
    fn test_builder_validates() {
        let result = ChatStreamConfigBuilder::new().base_url("").build();
        assert!(result.is_err());

        let unchecked = ChatStreamConfigBuilder::new().base_url("").build_unchecked();
        assert_eq!(unchecked.inference.base_url, "");
    }

    #[test]
    fn test_maybe_setters() {
        let config = ChatStreamConfigBuilder::new()
            .maybe_api_key(None::<String>)
            .maybe_log_dir(Some("/tmp/logs"))
            .maybe_log_level(None::<&str>)
            .build_unchecked();
        assert!(config.inference.api_key.is_none());
        assert_eq!(config.log_dir.as_deref(), Some("/tmp/logs"));
        assert!(config.log_level.is_none());
    }
}
