use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the remote recommendation API
    #[serde(default = "default_recommendation_api_url")]
    pub recommendation_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Attempts per refresh cycle, including the first one
    #[serde(default = "default_refresh_max_attempts")]
    pub refresh_max_attempts: u32,

    /// Delay before the second attempt; doubles for every attempt after that
    #[serde(default = "default_refresh_base_delay_ms")]
    pub refresh_base_delay_ms: u64,

    /// Per-request timeout for calls to the recommendation API
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_recommendation_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_refresh_max_attempts() -> u32 {
    5
}

fn default_refresh_base_delay_ms() -> u64 {
    5000
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
