//! AI provider abstractions and implementations.
//!
//! Each remote generation service sits behind a trait so the handler can be
//! exercised against deterministic stand-ins (see [`mock`]).

pub mod gemini;
pub mod mock;
pub mod openai;

use crate::models::InlineImage;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Image download failed")]
    DownloadFailed,
}

/// Text produced by a text/vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub text: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
}

/// Trait for text/vision generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a reply to `instruction`, optionally grounded on an image.
    async fn generate(
        &self,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<TextResponse, ProviderError>;

    /// Local readiness check; never calls the remote service.
    fn health_check(&self) -> Result<(), ProviderError>;
}

/// Trait for image generation providers (e.g., DALL·E).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image for `prompt` and return its transient URL.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Local readiness check; never calls the remote service.
    fn health_check(&self) -> Result<(), ProviderError>;
}

/// Build a provider HTTP client with the given request timeout.
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}
