use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::document::models::Language;

/// Application configuration loaded from environment variables.
/// Every variable has a default; a malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the file slot. Unused when `redis_url` is set.
    pub data_dir: PathBuf,
    /// Seed language when the slot is empty, and the initial display language.
    pub language: Language,
    /// Selects the Redis slot instead of the file slot.
    pub redis_url: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: optional_env("HUD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            language: optional_env("HUD_LANG")
                .map(|lang| lang.parse::<Language>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("HUD_LANG must be 'en' or 'zh'")?
                .unwrap_or_default(),
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
        })
    }
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
