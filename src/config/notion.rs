//! Content service configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Content service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    /// API keys (comma-separated), one pooled client per key
    pub api_keys: Option<Secret<String>>,

    /// Base URL of the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the API version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Items requested per listing call
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl NotionConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get API keys as a vector, skipping blanks
    pub fn api_key_list(&self) -> Vec<String> {
        self.api_keys
            .as_ref()
            .map(|keys| {
                keys.expose_secret()
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validate content service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key_list().is_empty() {
            return Err(ValidationError::MissingRequired("NOTION__API_KEYS"));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ValidationError::InvalidBaseUrl(self.base_url.clone())),
        }

        if !(1..=600).contains(&self.timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }

        if !(1..=100).contains(&self.page_size) {
            return Err(ValidationError::InvalidPageSize);
        }

        Ok(())
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_keys: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.notion.com".to_string()
}

fn default_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_page_size() -> u32 {
    100
}
