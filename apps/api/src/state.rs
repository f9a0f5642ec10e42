use std::sync::Arc;

use crate::analysis::PromptTable;
use crate::document::PageRasterizer;
use crate::llm_client::Generator;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Remote model. `GeminiClient` in production, a stub in tests.
    pub generator: Arc<dyn Generator>,
    /// First-page renderer. `PdfiumRasterizer` in production.
    pub rasterizer: Arc<dyn PageRasterizer>,
    /// Button → prompt table selected by `PROMPT_MAPPING`.
    pub prompts: PromptTable,
    pub max_upload_bytes: usize,
}
