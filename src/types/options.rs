//! Pipeline options and configuration
//!
//! This module contains the configuration for the execution pipeline,
//! including a builder pattern and environment loading.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Default backend base URL
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Path of the streaming execution route, relative to the endpoint
pub const EXECUTE_STREAM_PATH: &str = "/tool-calling/execute-stream";

/// Minimum time each delivered event stays on screen
pub const DEFAULT_MIN_EVENT_DURATION: Duration = Duration::from_millis(1500);

/// Default maximum size of a single stream frame (1MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Environment variable overriding the endpoint
pub const ENV_ENDPOINT: &str = "TASK_AGENT_ENDPOINT";
/// Environment variable overriding the minimum event duration, in milliseconds
pub const ENV_MIN_EVENT_MS: &str = "TASK_AGENT_MIN_EVENT_MS";
/// Environment variable overriding the maximum frame size, in bytes
pub const ENV_MAX_FRAME_BYTES: &str = "TASK_AGENT_MAX_FRAME_BYTES";
/// Environment variable setting a connect timeout, in milliseconds
pub const ENV_CONNECT_TIMEOUT_MS: &str = "TASK_AGENT_CONNECT_TIMEOUT_MS";

// ============================================================================
// Pipeline Options
// ============================================================================

/// Main options for the execution pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Base URL of the agent backend
    pub endpoint: String,
    /// Minimum spacing between two paced deliveries
    pub min_event_duration: Duration,
    /// Maximum size of one frame before it is discarded
    pub max_frame_size: usize,
    /// Optional connect timeout; the stream itself is never timed out
    pub connect_timeout: Option<Duration>,
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            min_event_duration: DEFAULT_MIN_EVENT_DURATION,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            connect_timeout: None,
            headers: HashMap::new(),
        }
    }
}

impl PipelineOptions {
    /// Create a new builder for `PipelineOptions`
    #[must_use]
    pub fn builder() -> PipelineOptionsBuilder {
        PipelineOptionsBuilder::default()
    }

    /// Load options from the process environment, falling back to defaults
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` if a variable is set but malformed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load options through an arbitrary key lookup
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` if a value is malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            options.endpoint = endpoint.trim().to_string();
        }
        if let Some(ms) = lookup(ENV_MIN_EVENT_MS) {
            options.min_event_duration =
                Duration::from_millis(parse_number(ENV_MIN_EVENT_MS, &ms)?);
        }
        if let Some(bytes) = lookup(ENV_MAX_FRAME_BYTES) {
            options.max_frame_size = usize::try_from(parse_number(ENV_MAX_FRAME_BYTES, &bytes)?)
                .map_err(|_| {
                    PipelineError::invalid_config(format!("{ENV_MAX_FRAME_BYTES} is too large"))
                })?;
        }
        if let Some(ms) = lookup(ENV_CONNECT_TIMEOUT_MS) {
            options.connect_timeout =
                Some(Duration::from_millis(parse_number(ENV_CONNECT_TIMEOUT_MS, &ms)?));
        }

        options.validate()?;
        Ok(options)
    }

    /// Check the options for obviously broken values
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(PipelineError::invalid_config("endpoint must not be empty"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(PipelineError::invalid_config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.max_frame_size == 0 {
            return Err(PipelineError::invalid_config(
                "max_frame_size must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Full URL of the streaming execution route
    #[must_use]
    pub fn stream_url(&self) -> String {
        self.url_for(EXECUTE_STREAM_PATH)
    }

    /// Join a route path onto the endpoint
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint.trim_end_matches('/'))
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| {
        PipelineError::invalid_config(format!("{key} must be a non-negative integer: {e}"))
    })
}

// ============================================================================
// Builder for PipelineOptions
// ============================================================================

/// Builder for `PipelineOptions`
#[derive(Debug, Default)]
pub struct PipelineOptionsBuilder {
    options: PipelineOptions,
}

impl PipelineOptionsBuilder {
    /// Set the backend base URL
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options.endpoint = endpoint.into();
        self
    }

    /// Set the minimum spacing between paced deliveries
    #[must_use]
    pub const fn min_event_duration(mut self, duration: Duration) -> Self {
        self.options.min_event_duration = duration;
        self
    }

    /// Set the maximum frame size
    #[must_use]
    pub const fn max_frame_size(mut self, size: usize) -> Self {
        self.options.max_frame_size = size;
        self
    }

    /// Set a connect timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = Some(timeout);
        self
    }

    /// Add a request header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> PipelineOptions {
        self.options
    }
}
