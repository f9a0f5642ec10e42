//! Test doubles shared by the unit tests: a recording model stub and
//! rasterisers that never touch pdfium.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::analysis::PromptTable;
use crate::document::{DocumentError, PageRasterizer, UploadedDocument};
use crate::llm_client::{Generator, LlmError, Part, Turn};
use crate::session::SessionStore;
use crate::state::AppState;

/// One captured `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub history: Vec<Turn>,
    pub parts: Vec<Part>,
}

/// Records every request and answers with a fixed reply (or a fixed failure).
pub struct StubGenerator {
    reply: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, history: &[Turn], parts: &[Part]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            history: history.to_vec(),
            parts: parts.to_vec(),
        });
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "stub outage".to_string(),
        })
    }
}

/// Returns a small fixed page image and counts renders.
#[derive(Default)]
pub struct StubRasterizer {
    renders: AtomicUsize,
}

impl StubRasterizer {
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl PageRasterizer for StubRasterizer {
    fn render_first_page(&self, _pdf: &[u8]) -> Result<DynamicImage, DocumentError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_fn(24, 32, |x, y| {
            Rgba([(x * 10) as u8, (y * 7) as u8, 128, 255])
        })))
    }
}

/// Behaves like pdfium on a corrupt file.
pub struct FailingRasterizer;

impl PageRasterizer for FailingRasterizer {
    fn render_first_page(&self, _pdf: &[u8]) -> Result<DynamicImage, DocumentError> {
        Err(DocumentError::Decode("trailer not found".to_string()))
    }
}

pub fn pdf_document(name: &str) -> UploadedDocument {
    UploadedDocument {
        file_name: name.to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: Bytes::from_static(b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF"),
    }
}

pub const TEST_SESSION_TTL: Duration = Duration::from_secs(600);

/// App state wired to the given stubs, with the default prompt table.
pub fn test_state(generator: Arc<StubGenerator>, rasterizer: Arc<StubRasterizer>) -> AppState {
    AppState {
        sessions: SessionStore::new(TEST_SESSION_TTL),
        generator,
        rasterizer,
        prompts: PromptTable::default(),
        max_upload_bytes: 1024 * 1024,
    }
}
