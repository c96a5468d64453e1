//! Request payloads and client construction for the HTTP transport

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::options::PipelineOptions;

/// Body of a streaming execution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Task text to execute
    pub prompt: String,
}

impl From<&str> for ExecuteRequest {
    fn from(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
        }
    }
}

/// Build a `reqwest` client honoring the connect timeout and extra headers
///
/// No overall request timeout is set; a stalled stream stays open until it
/// is cancelled or the backend closes it.
///
/// # Errors
/// Returns `PipelineError::InvalidConfig` for malformed header names or values
pub fn build_client(options: &PipelineOptions) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            PipelineError::invalid_config(format!("invalid header name '{name}': {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            PipelineError::invalid_config(format!("invalid value for header '{name}': {e}"))
        })?;
        headers.insert(name, value);
    }

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = options.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| PipelineError::invalid_config(format!("failed to build HTTP client: {e}")))
}
