use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::analysis::PromptMapping;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional at startup. A missing key only fails the remote call itself.
    pub google_api_key: Option<String>,
    pub gemini_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub prompt_mapping: PromptMapping,
    pub max_upload_bytes: usize,
    pub render_max_pixels: u32,
    pub pdfium_lib_path: Option<String>,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            prompt_mapping: parse_env("PROMPT_MAPPING", PromptMapping::Primary)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            render_max_pixels: check_render_max_pixels(parse_env("RENDER_MAX_PIXELS", 2000)?)?,
            pdfium_lib_path: optional_env("PDFIUM_LIB_PATH"),
            session_ttl: check_session_ttl(parse_env("SESSION_TTL_SECS", 3600)?)?,
        })
    }
}

/// pdfium takes the render edge as an `i32`; zero renders nothing.
fn check_render_max_pixels(pixels: u32) -> Result<u32> {
    ensure!(
        pixels > 0 && i32::try_from(pixels).is_ok(),
        "RENDER_MAX_PIXELS must be between 1 and {}, got {pixels}",
        i32::MAX
    );
    Ok(pixels)
}

fn check_session_ttl(secs: u64) -> Result<Duration> {
    ensure!(secs > 0, "SESSION_TTL_SECS must be greater than zero");
    Ok(Duration::from_secs(secs))
}

/// Reads a variable, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
