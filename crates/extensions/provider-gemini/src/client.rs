//! Gemini API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use commentpilot_protocols::{GenerationError, TextGenerator};

use crate::types::*;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const VALIDATION_PROMPT: &str = "Test request";

/// Gemini API client.
///
/// One POST per call, no retries. The API key travels with each call so
/// that the latest saved key is always used.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client for `model` served under `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Client for the public endpoint and default model.
    pub fn with_defaults() -> Result<Self, GenerationError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn post(&self, prompt: &str, api_key: &str) -> Result<Response, GenerationError> {
        debug!("Gemini generate_content: model={}", self.model);

        self.client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&GenerateContentRequest::prompt(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))
    }

    /// Generate content (non-streaming).
    pub async fn generate_content(
        &self,
        prompt: &str,
        api_key: &str,
    ) -> Result<String, GenerationError> {
        let response = self.post(prompt, api_key).await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<GeminiError>(&body) {
                Ok(e) => e.error.message,
                Err(_) => body,
            };
            warn!("Gemini request failed: status={}", status.as_u16());
            return Err(GenerationError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .first_text()
            .map(str::to_string)
            .map_err(|missing| GenerationError::MalformedResponse(missing.to_string()))
    }

    /// Check whether `api_key` is accepted by sending a throwaway prompt.
    ///
    /// Any non-2xx answer means the key is unusable; only transport failures
    /// are errors.
    pub async fn validate_key(&self, api_key: &str) -> Result<bool, GenerationError> {
        let response = self.post(VALIDATION_PROMPT, api_key).await?;
        let valid = response.status().is_success();
        if !valid {
            debug!("Gemini key validation rejected: status={}", response.status().as_u16());
        }
        Ok(valid)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn id(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, GenerationError> {
        self.generate_content(prompt, api_key).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
