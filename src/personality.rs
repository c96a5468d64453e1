//! Agent personality endpoint client
//!
//! The backend keeps a free-form personality description that is prepended to
//! every execution. [`PersonalityClient`] reads and replaces it through
//! `GET`/`POST <endpoint>/core/agent-personality`.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::transport::http::build_client;
use crate::types::options::PipelineOptions;

/// Route of the personality endpoint, relative to the endpoint
pub const PERSONALITY_PATH: &str = "/core/agent-personality";

/// Personality as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPersonality {
    /// Current description
    #[serde(default)]
    pub personality_description: String,
    /// Confirmation message, present on updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    personality_description: &'a str,
}

/// Client for the personality endpoint
#[derive(Debug, Clone)]
pub struct PersonalityClient {
    client: reqwest::Client,
    url: String,
}

impl PersonalityClient {
    /// Create a client from pipeline options
    ///
    /// # Errors
    /// Returns error if the options are invalid or the client cannot be built
    pub fn new(options: &PipelineOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            client: build_client(options)?,
            url: options.url_for(PERSONALITY_PATH),
        })
    }

    /// Fetch the current personality
    ///
    /// # Errors
    /// Returns error on network failure, a non-success status, or a
    /// malformed body
    pub async fn load(&self) -> Result<AgentPersonality> {
        log::debug!("Loading agent personality from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        Self::read(response).await
    }

    /// Replace the personality description
    ///
    /// # Errors
    /// Returns error on network failure, a non-success status, or a
    /// malformed body
    pub async fn update(&self, description: &str) -> Result<AgentPersonality> {
        log::info!("Updating agent personality ({} chars)", description.chars().count());
        let response = self
            .client
            .post(&self.url)
            .json(&UpdateRequest {
                personality_description: description,
            })
            .send()
            .await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<AgentPersonality> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|body| !body.is_empty());
            log::error!("Personality request returned {status}");
            return Err(PipelineError::http_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
