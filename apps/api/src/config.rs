use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Nothing here is strictly required: without a project id the service
/// still boots and serves deterministic fallback answers (the reference
/// cache keeps refreshing regardless).
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project id. `None` puts inference permanently in fallback mode.
    pub project: Option<String>,
    pub location: String,
    pub model: String,
    /// Static token override; skips the metadata-service fetch when set.
    pub oauth_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            project: optional_env("GOOGLE_CLOUD_PROJECT").or_else(|| optional_env("GCP_PROJECT")),
            location: std::env::var("VERTEX_LOCATION")
                .unwrap_or_else(|_| "us-central1".to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            oauth_token: optional_env("GOOGLE_OAUTH_ACCESS_TOKEN"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_dir: PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string())),
        })
    }
}

/// Reads an env var, treating unset and empty identically.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
