pub mod currencies;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://api.hyperx.llc";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Which client shell the library is embedded in. Selects the currency catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientProfile {
    Web,
    Mobile,
}

impl ClientProfile {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "web" => Some(ClientProfile::Web),
            "mobile" => Some(ClientProfile::Mobile),
            _ => None,
        }
    }
}

/// Backend and local cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Transport-level timeout applied by the HTTP client
    pub request_timeout_secs: u64,
    /// Directory holding the write-through cache files
    pub storage_dir: PathBuf,
    pub profile: ClientProfile,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_dir: default_storage_dir(),
            profile: ClientProfile::Web,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("HYPERX_API_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            request_timeout_secs: std::env::var("HYPERX_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            storage_dir: std::env::var("HYPERX_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_storage_dir()),
            profile: std::env::var("HYPERX_CLIENT_PROFILE")
                .ok()
                .and_then(|v| ClientProfile::parse(&v))
                .unwrap_or(ClientProfile::Web),
        }
    }

    /// Check if the configuration can be used to reach a backend
    pub fn is_valid(&self) -> bool {
        (self.base_url.starts_with("https://") || self.base_url.starts_with("http://"))
            && self.request_timeout_secs > 0
    }

    /// Full URL for an endpoint path such as `/v1/wallet/history`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn default_storage_dir() -> PathBuf {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(format!("{home_dir}/.hyperx_wallet"))
}
