//! Mock provider implementations for testing.

use super::{ImageProvider, ProviderError, TextProvider, TextResponse};
use crate::models::InlineImage;
use async_trait::async_trait;
use std::sync::Mutex;

/// A request as seen by [`MockTextProvider`].
#[derive(Debug, Clone)]
pub struct RecordedTextRequest {
    pub instruction: String,
    pub image: Option<InlineImage>,
}

/// Mock text provider returning a fixed reply or a fixed failure.
pub struct MockTextProvider {
    reply: Result<String, String>,
    requests: Mutex<Vec<RecordedTextRequest>>,
}

impl MockTextProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedTextRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        instruction: &str,
        image: Option<&InlineImage>,
    ) -> Result<TextResponse, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedTextRequest {
                instruction: instruction.to_string(),
                image: image.cloned(),
            });
        }

        match &self.reply {
            Ok(text) => Ok(TextResponse {
                text: text.clone(),
                input_tokens: instruction.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
            }),
            Err(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Mock image provider returning a fixed URL or a fixed failure.
pub struct MockImageProvider {
    url: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockImageProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Ok(url.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            url: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        self.url.clone().map_err(ProviderError::ApiError)
    }

    fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
