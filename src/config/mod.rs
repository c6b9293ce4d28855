//! Configuration module for the slide composition backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the API (optional, dev mode when unset)
    pub api_psk: Option<String>,
    /// Base URL of the draft, image, analysis and export services
    pub upstream_url: String,
    /// Base URL of the icon resource provider (`{base}/{name}.svg`)
    pub icon_base_url: String,
    /// Bounded wait for a single image generation request
    pub image_timeout: Option<Duration>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit log lines as JSON
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("CYBERSLIDE_API_PSK")
            .ok()
            .filter(|psk| !psk.trim().is_empty());

        let upstream_url = env::var("CYBERSLIDE_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let icon_base_url = env::var("CYBERSLIDE_ICON_BASE_URL")
            .unwrap_or_else(|_| "https://unpkg.com/lucide-static@latest/icons".to_string())
            .trim_end_matches('/')
            .to_string();

        let image_timeout_secs: u64 = env::var("CYBERSLIDE_IMAGE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .expect("Invalid CYBERSLIDE_IMAGE_TIMEOUT_SECS value");
        let image_timeout = (image_timeout_secs > 0).then(|| Duration::from_secs(image_timeout_secs));

        let bind_addr = env::var("CYBERSLIDE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid CYBERSLIDE_BIND_ADDR format");

        let log_level = env::var("CYBERSLIDE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("CYBERSLIDE_LOG_JSON")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            api_psk,
            upstream_url,
            icon_base_url,
            image_timeout,
            bind_addr,
            log_level,
            log_json,
        }
    }
}
