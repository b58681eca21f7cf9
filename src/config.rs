use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::policy::DurationPolicy;
use crate::{captions, enrich, youtube};

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the Data API key. Never read from request input.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_window: Option<String>,
    pub default_language: Option<String>,
    pub default_duration: Option<String>,
    pub transcript_url: Option<String>,
    pub summary_url: Option<String>,
    pub timedtext_url: Option<String>,
    pub youtube_api_base: Option<String>,
    pub bind: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub duration_thresholds: DurationPolicy,
}

impl Config {
    /// Load config from ~/.config/ytscout/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn transcript_url(&self) -> &str {
        self.transcript_url.as_deref().unwrap_or(enrich::DEFAULT_TRANSCRIPT_URL)
    }

    pub fn summary_url(&self) -> &str {
        self.summary_url.as_deref().unwrap_or(enrich::DEFAULT_SUMMARY_URL)
    }

    pub fn timedtext_url(&self) -> &str {
        self.timedtext_url.as_deref().unwrap_or(captions::DEFAULT_TIMEDTEXT_URL)
    }

    pub fn youtube_api_base(&self) -> &str {
        self.youtube_api_base.as_deref().unwrap_or(youtube::DEFAULT_API_BASE)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Shared HTTP client. The timeout turns a stalled upstream into an error.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ytscout/", env!("CARGO_PKG_VERSION")))
            .timeout(self.request_timeout())
            .build()?;
        Ok(client)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytscout")
        .join("config.toml")
}

/// The Data API key from the environment.
pub fn api_key() -> Result<String> {
    std::env::var(API_KEY_VAR)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| eyre::eyre!("{API_KEY_VAR} environment variable not set (required for searching)"))
}
