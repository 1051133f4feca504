//! Client Configuration

use serde::{Deserialize, Serialize};

/// Local storage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Backend location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Base URL baked in at build time (`TRAINIT_API_BASE`), else the default
    pub fn from_build_env() -> Self {
        match option_env!("TRAINIT_API_BASE") {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    /// Join an API path onto the base URL with exactly one slash between them
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
