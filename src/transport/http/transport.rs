//! HTTP transport implementation

use futures::{StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;

use crate::error::{PipelineError, Result};
use crate::transport::{EventByteStream, Transport};
use crate::types::options::PipelineOptions;

use super::config::{ExecuteRequest, build_client};

/// Streaming HTTP transport for the tool-calling backend
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport from pipeline options
    ///
    /// # Errors
    /// Returns error if the options are invalid or the client cannot be built
    pub fn new(options: &PipelineOptions) -> Result<Self> {
        options.validate()?;
        Self::with_client(build_client(options)?, options)
    }

    /// Create a transport around an existing client
    ///
    /// # Errors
    /// Returns error if the options are invalid
    pub fn with_client(client: reqwest::Client, options: &PipelineOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            client,
            url: options.stream_url(),
        })
    }

    /// URL the transport posts to
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    async fn open(&self, prompt: &str) -> Result<EventByteStream> {
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "text/event-stream")
            .json(&ExecuteRequest::from(prompt))
            .send()
            .await
            .map_err(|e| {
                log::error!("Execution request to {} failed: {e}", self.url);
                PipelineError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Execution request to {} returned {status}", self.url);
            return Err(PipelineError::http_status(status.as_u16(), None));
        }

        log::debug!("Execution stream opened: {status}");
        let url = self.url.clone();
        Ok(response
            .bytes_stream()
            .map_err(move |e| {
                log::error!("Execution stream from {url} interrupted: {e}");
                PipelineError::transport(format!("Stream interrupted: {e}"))
            })
            .boxed())
    }
}
