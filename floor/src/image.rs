//! Background image intake: raw bytes in, opaque data URI out.
//!
//! The engine never looks inside an [`EncodedImage`]; it is stored verbatim in
//! an area's layout and handed back to the renderer.

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;

use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Opaque string-encoded image reference (normally a `data:` URI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(Arc<str>);

impl EncodedImage {
    /// Wrap an already-encoded reference without inspecting it.
    #[must_use]
    pub fn from_encoded(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Why a selected file could not become a background.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("not an image: {mime}")]
    NotAnImage { mime: String },
    #[error("image is empty")]
    Empty,
    #[error("failed to read image: {0}")]
    Read(String),
}

/// Encode image bytes as a base64 `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> Result<EncodedImage, ImageError> {
    let mime = mime.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(ImageError::NotAnImage { mime });
    }
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }
    let uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
    Ok(EncodedImage::from_encoded(uri))
}

/// Guess the MIME type of an image file from its extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string()
}
