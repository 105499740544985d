use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default storage quota, matching the 5 MiB a browser grants localStorage.
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; a missing API key is tolerated.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub data_dir: PathBuf,
    pub storage_quota_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            data_dir: optional_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            storage_quota_bytes: match optional_env("STORAGE_QUOTA_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("STORAGE_QUOTA_BYTES must be a byte count")?,
                None => DEFAULT_STORAGE_QUOTA_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            data_dir: PathBuf::from(":memory:"),
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}
