use crate::models::{AnalyzeResponse, ImageUpload, Mode, INVALID_MODE, PROMPT_REQUIRED};
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use service_core::error::AppError;

/// Raw form fields of an `/analyze` submission.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub prompt: String,
    pub mode: String,
    pub image: Option<ImageUpload>,
}

impl AnalyzeForm {
    /// Read every field of the form. Unknown fields are drained and ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("prompt") => form.prompt = field.text().await.map_err(multipart_error)?,
                Some("mode") => form.mode = field.text().await.map_err(multipart_error)?,
                Some("image") => {
                    // A part without a file name is not a file upload.
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if !file_name.is_empty() {
                        form.image = Some(ImageUpload {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {
                    field.bytes().await.map_err(multipart_error)?;
                }
            }
        }

        Ok(form)
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("Failed to read form data: {}", e.body_text()))
}

/// `POST /analyze`
///
/// Validates the prompt, applies the banned-term filter, then dispatches to
/// the text or image flow according to `mode`.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let form = AnalyzeForm::from_multipart(multipart).await?;

    let prompt = form.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest(PROMPT_REQUIRED.to_string()));
    }

    if let Some(term) = state.content_filter.find_match(prompt) {
        tracing::info!(term = %term, "Prompt refused by content filter");
        return Ok(Json(AnalyzeResponse::refusal()));
    }

    let mode: Mode = form.mode.parse().map_err(|e| {
        tracing::debug!(error = %e, "Rejected request mode");
        AppError::BadRequest(INVALID_MODE.to_string())
    })?;

    tracing::info!(mode = ?mode, prompt_len = prompt.len(), "Dispatching analysis request");

    match mode {
        Mode::Text => {
            let output = state
                .analyzer
                .consult(prompt, form.image)
                .await
                .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

            Ok(Json(AnalyzeResponse::text(output)))
        }
        Mode::Image => {
            let image = state
                .analyzer
                .render(prompt)
                .await
                .map_err(|e| AppError::Upstream(e.to_string()))?;

            Ok(Json(AnalyzeResponse::image(image)))
        }
    }
}
