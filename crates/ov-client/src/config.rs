//! Client configuration, read from the environment.
//!
//! - `OVERLAY_API_URL`: base URL of the REST API (default `http://127.0.0.1:8000`)
//! - `OVERLAY_REQUEST_TIMEOUT_SECS`: whole-request timeout (default 60)
//! - `OVERLAY_CONNECT_TIMEOUT_SECS`: connect timeout (default 10)
//! - `OVERLAY_RENDER_DPI`: resolution asked for when recomposing (default 450)

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RENDER_DPI: u32 = 450;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub render_dpi: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            render_dpi: DEFAULT_RENDER_DPI,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let base_url = lookup("OVERLAY_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let render_dpi = lookup("OVERLAY_RENDER_DPI")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|dpi| *dpi > 0)
            .unwrap_or(DEFAULT_RENDER_DPI);
        Self {
            base_url,
            request_timeout: Duration::from_secs(parse(
                "OVERLAY_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(parse(
                "OVERLAY_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            render_dpi,
        }
    }
}
