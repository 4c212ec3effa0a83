use super::*;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &ChatStreamConfig) -> ConfigResult<()> {
        Self::validate_inference(&config.inference)?;
        Self::validate_history(config)?;

        if let Some(level) = &config.log_level {
            Self::validate_log_level(level)?;
        }

        Ok(())
    }

    fn validate_inference(inference: &InferenceConfig) -> ConfigResult<()> {
        if inference.base_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "inference.base_url",
            });
        }

        if !inference.base_url.starts_with("http://") && !inference.base_url.starts_with("https://")
        {
            return Err(ConfigError::invalid(
                "inference.base_url",
                inference.base_url.clone(),
                "URL must start with http:// or https://",
            ));
        }

        if inference.stream_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "inference.stream_path",
            });
        }

        if inference.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "inference.request_timeout_secs",
                inference.request_timeout_secs,
                "Must be > 0",
            ));
        }

        if inference.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "inference.connect_timeout_secs",
                inference.connect_timeout_secs,
                "Must be > 0",
            ));
        }

        if inference.connect_timeout_secs > inference.request_timeout_secs {
            return Err(ConfigError::TimeoutConflict {
                connect_secs: inference.connect_timeout_secs,
                request_secs: inference.request_timeout_secs,
            });
        }

        if let Some(key) = &inference.api_key {
            if key.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "inference.api_key",
                    "<blank>",
                    "API key must not be blank when set",
                ));
            }
        }

        Ok(())
    }

    fn validate_history(config: &ChatStreamConfig) -> ConfigResult<()> {
        if config.title_max_chars == 0 {
            return Err(ConfigError::invalid(
                "title_max_chars",
                config.title_max_chars,
                "Must be > 0",
            ));
        }

        if config.default_title.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "default_title",
            });
        }

        Ok(())
    }

    fn validate_log_level(level: &str) -> ConfigResult<()> {
        if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            Ok(())
        } else {
            Err(ConfigError::invalid(
                "log_level",
                level,
                format!("Must be one of: {}", LOG_LEVELS.join(", ")),
            ))
        }
    }
}
