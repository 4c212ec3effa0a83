//! Chat stream configuration: inference endpoint, history backend, titles and logging.

pub mod builder;
pub mod types;
pub mod validation;

pub use builder::*;
pub use types::*;
pub use validation::*;

/// Errors raised while building or validating a [`ChatStreamConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `field` is the dotted config path, e.g. `inference.base_url`
    #[error("Invalid value for '{field}': {value} - {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingRequired { field: &'static str },

    #[error(
        "Connect timeout ({connect_secs}s) exceeds the read timeout ({request_secs}s)"
    )]
    TimeoutConflict { connect_secs: u64, request_secs: u64 },
}

impl ConfigError {
    pub fn invalid(field: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
