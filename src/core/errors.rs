use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Code used when a failure carries no usable error code.
pub const UNKNOWN_ERROR_CODE: i64 = -1;

const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Errors raised by the dispatch layer.
///
/// `ConfigError` and `InvalidParameters` are raised synchronously before any
/// network activity; `Api` wraps the normalized error of a failed call.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("API error: {0}")]
    Api(#[from] NormalizedError),
}

impl DispatchError {
    /// The normalized error, if this failure came back from a dispatched call.
    pub fn as_api_error(&self) -> Option<&NormalizedError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// The single error shape every failed call is reduced to: `{code, error}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code} - {}", .error.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
pub struct NormalizedError {
    pub code: i64,
    pub error: Option<String>,
}

impl NormalizedError {
    pub fn new(code: i64, error: impl Into<String>) -> Self {
        Self {
            code,
            error: Some(error.into()),
        }
    }

    /// An error with no recoverable code.
    pub fn unknown(error: Option<String>) -> Self {
        Self {
            code: UNKNOWN_ERROR_CODE,
            error,
        }
    }

    pub fn message(&self) -> &str {
        self.error.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE)
    }
}

/// Failure reported by a [`Transport`](crate::core::traits::Transport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server replied and the transport already decoded the body.
    #[error("request failed with status {status}")]
    Structured { status: u16, response: Value },

    /// The server replied but the body was kept as text.
    #[error("request failed with status {status}: {response_text}")]
    Text { status: u16, response_text: String },

    /// No response at all: timeout, DNS, connection reset, abort.
    #[error("{message}")]
    Failed { code: Option<i64>, message: String },
}
