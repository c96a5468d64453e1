//! Error types for the execution pipeline

use thiserror::Error;

/// Main error type for the execution pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Network or connection failure while talking to the agent backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body, when it could be read
        body: Option<String>,
    },

    /// A single stream frame could not be decoded into an event
    #[error("Decode error: {message}")]
    Decode {
        /// Error message
        message: String,
        /// Raw frame payload that failed to decode
        frame: Option<String>,
    },

    /// JSON decode error
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame grew past the configured limit and was discarded
    #[error("Stream frame exceeded maximum size of {limit} bytes")]
    FrameTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The session was cancelled locally
    #[error("Session cancelled")]
    Cancelled,
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an HTTP status error
    #[must_use]
    pub const fn http_status(status: u16, body: Option<String>) -> Self {
        Self::HttpStatus { status, body }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>, frame: Option<String>) -> Self {
        Self::Decode {
            message: msg.into(),
            frame,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this error is the normal cancellation path rather than a failure
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the session must be aborted because of this error
    ///
    /// Decode failures only drop the offending frame.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Decode { .. } | Self::FrameTooLarge { .. } | Self::JsonDecode(_) | Self::Cancelled
        )
    }

    /// Message surfaced to the execution state when this error ends a session
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::HttpStatus { status, .. } => format!("HTTP error! status: {status}"),
            Self::Http(e) if e.is_connect() => {
                "Could not connect to the agent backend".to_string()
            }
            Self::Http(e) if e.is_timeout() => {
                "Connection to the agent backend timed out".to_string()
            }
            Self::Http(e) => format!("Request failed: {e}"),
            Self::Transport(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
