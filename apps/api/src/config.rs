use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::cv::Language;

/// Application configuration loaded from environment variables.
/// Every variable is optional; missing ones fall back to defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the persisted document record.
    pub data_dir: PathBuf,
    /// `None` disables AI assist; calls short-circuit without network traffic.
    pub anthropic_api_key: Option<String>,
    pub default_language: Language,
    pub assist_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            data_dir: PathBuf::from("./data"),
            anthropic_api_key: None,
            default_language: Language::En,
            assist_timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Ok(Config {
            port: match var("PORT") {
                Some(v) => v
                    .trim()
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
            data_dir: var("CV_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            anthropic_api_key: var("ANTHROPIC_API_KEY").map(|k| k.trim().to_string()),
            default_language: match var("DEFAULT_LANGUAGE") {
                Some(v) => v
                    .parse::<Language>()
                    .map_err(anyhow::Error::msg)
                    .context("DEFAULT_LANGUAGE must be 'en' or 'vi'")?,
                None => defaults.default_language,
            },
            assist_timeout: match var("ASSIST_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.trim()
                        .parse::<u64>()
                        .context("ASSIST_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                None => defaults.assist_timeout,
            },
        })
    }
}
