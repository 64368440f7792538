//! Downloads generated images from the transient URLs providers return.

use crate::models::GeneratedImage;
use crate::services::media::subtype_from_content_type;
use crate::services::providers::{http_client, ProviderError};
use base64::Engine;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// Fetches image bytes over plain HTTP and inlines them as base64.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }

    /// Download `url`. Anything but a 200 is reported as a failed download.
    pub async fn fetch(&self, url: &str) -> Result<GeneratedImage, ProviderError> {
        let response = self
            .client
            .traced_get(url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "Image download returned non-200 status");
            return Err(ProviderError::DownloadFailed);
        }

        let mime = subtype_from_content_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        tracing::debug!(size = bytes.len(), mime = %mime, "Image fetched");

        Ok(GeneratedImage {
            image_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
            mime,
        })
    }
}
