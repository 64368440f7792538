//! The two request flows behind `/analyze`.

use crate::models::{GeneratedImage, ImageUpload, InlineImage};
use crate::services::image_fetcher::ImageFetcher;
use crate::services::media::image_media_type;
use crate::services::prompt::build_instruction;
use crate::services::providers::{ImageProvider, ProviderError, TextProvider};
use std::sync::Arc;

/// Holds the provider handles shared by every request.
#[derive(Clone)]
pub struct Analyzer {
    text_provider: Arc<dyn TextProvider>,
    image_provider: Arc<dyn ImageProvider>,
    fetcher: ImageFetcher,
}

impl Analyzer {
    pub fn new(
        text_provider: Arc<dyn TextProvider>,
        image_provider: Arc<dyn ImageProvider>,
        fetcher: ImageFetcher,
    ) -> Self {
        Self {
            text_provider,
            image_provider,
            fetcher,
        }
    }

    /// Text flow: consultant-style answer, optionally grounded on an upload.
    pub async fn consult(
        &self,
        prompt: &str,
        upload: Option<ImageUpload>,
    ) -> Result<String, ProviderError> {
        let image = upload.and_then(load_inline_image);
        let instruction = build_instruction(prompt);

        let response = self
            .text_provider
            .generate(&instruction, image.as_ref())
            .await?;

        tracing::info!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            has_image = image.is_some(),
            "Text generation completed"
        );

        Ok(response.text)
    }

    /// Image flow: generate one image, download it and inline it.
    pub async fn render(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let url = self.image_provider.generate(prompt).await?;
        tracing::info!("Image generated, downloading");

        let image = self.fetcher.fetch(&url).await?;
        tracing::info!(mime = %image.mime, "Image downloaded");

        Ok(image)
    }

    pub fn health_check(&self) -> Result<(), ProviderError> {
        self.text_provider.health_check()?;
        self.image_provider.health_check()
    }
}

/// Turn an upload into an inline image part, or drop it.
///
/// An upload that is empty or that cannot be classified as an image is
/// skipped rather than failing the request.
pub fn load_inline_image(upload: ImageUpload) -> Option<InlineImage> {
    if upload.bytes.is_empty() {
        tracing::warn!(file_name = %upload.file_name, "Uploaded image is empty, ignoring it");
        return None;
    }

    match image_media_type(&upload.file_name, &upload.bytes) {
        Some(mime_type) => Some(InlineImage {
            mime_type,
            data: upload.bytes,
        }),
        None => {
            tracing::warn!(
                file_name = %upload.file_name,
                "Could not determine image type of upload, ignoring it"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn recognised_upload_becomes_inline_image() {
        let image = load_inline_image(upload("floorplan.jpg", b"JPEGDATA")).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, b"JPEGDATA");
    }

    #[test]
    fn unclassified_upload_is_dropped() {
        assert!(load_inline_image(upload("floorplan.docx", b"DATA")).is_none());
        assert!(load_inline_image(upload("floorplan", b"DATA")).is_none());
    }

    #[test]
    fn empty_upload_is_dropped() {
        assert!(load_inline_image(upload("floorplan.png", b"")).is_none());
    }
}
