//! Media type detection for uploaded reference images.

/// Image media type of an upload.
///
/// The file name is looked up in the MIME database first; when that does not
/// yield an `image/*` type the leading bytes are sniffed. Anything that still
/// is not an image returns `None`.
pub fn image_media_type(file_name: &str, data: &[u8]) -> Option<String> {
    mime_guess::from_path(file_name)
        .iter()
        .find(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .or_else(|| {
            infer::get(data)
                .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
                .map(|kind| kind.mime_type().to_string())
        })
}

/// Subtype of a `Content-Type` header value: everything after the last `/`,
/// trimmed. Parameters stay attached. A missing header yields `png`.
pub fn subtype_from_content_type(content_type: Option<&str>) -> String {
    match content_type {
        Some(ct) => ct.rsplit('/').next().unwrap_or_default().trim().to_string(),
        None => "png".to_string(),
    }
}
