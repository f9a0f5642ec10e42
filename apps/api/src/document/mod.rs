//! Résumé document handling: first page of the uploaded PDF → one base64 JPEG part.
//!
//! Only page 1 is ever rendered. The conversion is recomputed on every
//! action; nothing here caches.

pub mod encode;
pub mod render;

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use encode::encode_jpeg;
pub use render::{PageRasterizer, PdfiumRasterizer};

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File not uploaded")]
    NotUploaded,

    #[error("PDF could not be decoded: {0}")]
    Decode(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("{0}")]
    Internal(String),
}

/// Inline image payload sent to the model: `{mime_type, data}` with base64 data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: String,
}

/// The PDF currently attached to a session. Replaced wholesale on every upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Returns true when the payload looks like a PDF, by magic bytes or declared type.
pub fn looks_like_pdf(bytes: &[u8], content_type: Option<&str>) -> bool {
    bytes.starts_with(b"%PDF") || content_type == Some("application/pdf")
}

/// Converts the uploaded PDF into a single-element list of image parts.
///
/// `None` is a precondition failure: callers are expected to check for an
/// upload first. Rasteriser failures surface as [`DocumentError::Decode`].
pub async fn pdf_to_image_parts(
    document: Option<Bytes>,
    rasterizer: Arc<dyn PageRasterizer>,
) -> Result<Vec<ImagePart>, DocumentError> {
    let bytes = document.ok_or(DocumentError::NotUploaded)?;

    let image = tokio::task::spawn_blocking(move || rasterizer.render_first_page(&bytes))
        .await
        .map_err(|e| DocumentError::Internal(format!("Render task panicked: {e}")))??;

    let part = encode_jpeg(&image)?;
    debug!(
        "First page {}x{} px → {} bytes base64",
        image.width(),
        image.height(),
        part.data.len()
    );

    Ok(vec![part])
}
