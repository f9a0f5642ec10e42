//! PDF rasterisation via pdfium. Only the first page is ever rendered.

use std::path::PathBuf;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use super::DocumentError;

/// Renders the first page of a PDF. Implementations block; callers run
/// them on the blocking pool.
pub trait PageRasterizer: Send + Sync {
    fn render_first_page(&self, pdf: &[u8]) -> Result<DynamicImage, DocumentError>;
}

/// pdfium-backed rasteriser. Binds the library per call, so a missing
/// pdfium only fails the request that needed it.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    /// Longest rendered edge in pixels.
    max_pixels: u32,
    /// Directory holding the pdfium shared library. `None` uses the system library.
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(max_pixels: u32, library_dir: Option<PathBuf>) -> Self {
        Self {
            max_pixels,
            library_dir,
        }
    }

    fn bind(&self) -> Result<Pdfium, DocumentError> {
        let bindings = match &self.library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| DocumentError::Internal(format!("pdfium library unavailable: {e:?}")))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_first_page(&self, pdf: &[u8]) -> Result<DynamicImage, DocumentError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| DocumentError::Decode(format!("{e:?}")))?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(DocumentError::Decode("PDF has no pages".to_string()));
        }

        let edge = i32::try_from(self.max_pixels)
            .map_err(|_| DocumentError::Internal(format!("render edge {} too large", self.max_pixels)))?;
        let render_config = PdfRenderConfig::new()
            .set_target_width(edge)
            .set_maximum_height(edge);

        let page = pages
            .get(0)
            .map_err(|e| DocumentError::Decode(format!("page 1: {e:?}")))?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| DocumentError::Decode(format!("page 1: {e:?}")))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page 1 of {} → {}x{} px",
            pages.len(),
            image.width(),
            image.height()
        );

        Ok(image)
    }
}
