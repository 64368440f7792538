//! OpenAI image generation provider (DALL·E).
//!
//! Requests a single image via `POST /images/generations` and returns the
//! transient URL the service hands back.

use super::{http_client, ImageProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// OpenAI image provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiImageConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub size: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// DALL·E image provider.
pub struct OpenAiImageProvider {
    config: OpenAiImageConfig,
    client: Client,
}

impl OpenAiImageProvider {
    pub fn new(config: OpenAiImageConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/images/generations",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ImageGenerationRequest<'a> {
        ImageGenerationRequest {
            model: &self.config.model,
            prompt,
            n: 1,
            size: &self.config.size,
            response_format: "url",
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            size = %self.config.size,
            prompt_len = prompt.len(),
            "Sending image generation request to OpenAI"
        );

        let response = self
            .client
            .traced_post(&self.api_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            let message = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);

            return Err(ProviderError::ApiError(format!(
                "OpenAI API error {}: {}",
                status, message
            )));
        }

        let body: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        first_url(body)
    }

    fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

fn first_url(body: ImageGenerationResponse) -> Result<String, ProviderError> {
    body.data
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .ok_or_else(|| {
            ProviderError::InvalidResponse("OpenAI response contained no image URL".to_string())
        })
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
