mod analysis;
mod config;
mod document;
mod errors;
mod llm_client;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::PromptTable;
use crate::config::Config;
use crate::document::PdfiumRasterizer;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyser v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    if config.google_api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; model calls will fail until it is provided");
    }
    let generator = GeminiClient::new(config.google_api_key.clone(), &config.gemini_base_url)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize PDF rasteriser (pdfium is bound lazily per render)
    let rasterizer = PdfiumRasterizer::new(
        config.render_max_pixels,
        config.pdfium_lib_path.as_ref().map(PathBuf::from),
    );

    let prompts = PromptTable::for_mapping(config.prompt_mapping);
    info!("Prompt mapping: {:?}", config.prompt_mapping);
    info!("Idle sessions expire after {}s", config.session_ttl.as_secs());

    // Build app state
    let state = AppState {
        sessions: SessionStore::new(config.session_ttl),
        generator: Arc::new(generator),
        rasterizer: Arc::new(rasterizer),
        prompts,
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
