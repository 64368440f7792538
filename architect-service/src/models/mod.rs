//! Request-scoped values exchanged through `/analyze`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Returned instead of calling a provider when the prompt trips the filter.
pub const REFUSAL_MESSAGE: &str = "❌ Sorry, I can only help with architectural design prompts like buildings, homes, interiors, materials, or layout ideas.";

pub const PROMPT_REQUIRED: &str = "Prompt is required.";

pub const INVALID_MODE: &str = "Invalid mode specified. Use 'text' or 'image'.";

/// Which flow handles the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Image,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mode {0:?}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Mode::Text),
            "image" => Ok(Mode::Image),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// An uploaded reference image, as received.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Image bytes ready to be attached to a text/vision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A generated image, inlined as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub image_base64: String,
    pub mime: String,
}

/// Success body of `/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub output: String,
    pub image: Option<GeneratedImage>,
}

impl AnalyzeResponse {
    pub fn text(output: String) -> Self {
        Self {
            output,
            image: None,
        }
    }

    pub fn image(image: GeneratedImage) -> Self {
        Self {
            output: String::new(),
            image: Some(image),
        }
    }

    pub fn refusal() -> Self {
        Self::text(REFUSAL_MESSAGE.to_string())
    }
}
