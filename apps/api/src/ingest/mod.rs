//! Resume ingestion — renders the first page of an uploaded PDF to a
//! base64-encoded JPEG ready for a multimodal model request.
//!
//! The document is read once and discarded: nothing is written to disk and
//! nothing is cached between requests. Only page index 0 is ever rendered;
//! a document with zero pages is a malformed-document error, never a
//! partially-constructed payload.

use base64::Engine;
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Media type of every rendered page payload.
pub const PAGE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no resume file was supplied")]
    MissingUpload,

    #[error("{0}")]
    MalformedDocument(String),

    #[error("PDF backend unavailable: {0}")]
    Backend(String),

    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// A rendered resume page, encoded for transport to the model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlinePage {
    pub mime_type: String,
    /// Base64-encoded JPEG bytes.
    pub data: String,
}

/// The rasterization seam. Implement this to swap PDF backends without
/// touching the evaluation pipeline.
///
/// Carried in `AppState` as `Arc<dyn PageRenderer>`. Implementations are
/// synchronous — callers run them on the blocking pool.
pub trait PageRenderer: Send + Sync {
    fn render_first_page(&self, pdf_bytes: &[u8]) -> Result<InlinePage, IngestError>;
}

/// Production renderer backed by pdfium.
///
/// pdfium is not async-safe and its handle is not `Send`, so the library is
/// bound fresh inside each call; callers wrap the call in `spawn_blocking`.
pub struct PdfiumRenderer;

impl PageRenderer for PdfiumRenderer {
    fn render_first_page(&self, pdf_bytes: &[u8]) -> Result<InlinePage, IngestError> {
        let pdfium = Pdfium::new(
            Pdfium::bind_to_system_library()
                .map_err(|e| IngestError::Backend(format!("{e:?}")))?,
        );

        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| IngestError::MalformedDocument(format!("not a readable PDF: {e:?}")))?;

        let pages = document.pages();
        let page = pages.first().map_err(|_| {
            IngestError::MalformedDocument("document has no pages".to_string())
        })?;

        // Native resolution: one pixel per PDF point (72 dpi).
        let width = page.width().value.round().max(1.0) as i32;

        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().set_target_width(width))
            .map_err(|e| {
                IngestError::MalformedDocument(format!("first page failed to render: {e:?}"))
            })?;

        debug!("rendered page 0 of {} at {}pt wide", pages.len(), width);

        encode_page(bitmap.as_image())
    }
}

/// JPEG-encodes a rendered page and wraps it as a base64 `InlinePage`.
pub fn encode_page(image: DynamicImage) -> Result<InlinePage, IngestError> {
    let rgb = image.to_rgb8();

    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new(&mut jpeg);
    rgb.write_with_encoder(encoder)
        .map_err(|e| IngestError::Encode(e.to_string()))?;

    Ok(InlinePage {
        mime_type: PAGE_MIME_TYPE.to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&jpeg),
    })
}
