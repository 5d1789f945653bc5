// src/utils/config.rs
//! Upstream API configuration, read from environment variables.

use anyhow::{Context, Result};
use log::info;
use std::env;
use std::time::Duration;
use url::Url;

use crate::utils::constants::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Catalog URL under which each dataset exposes `/{dataset}/records`
    pub base_url: Url,
    /// Per-request timeout; an expired request counts as a transport failure
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("COMMUNE_API_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url)
            .with_context(|| format!("Invalid COMMUNE_API_BASE_URL: {}", raw_url))?;

        let timeout_secs = lookup("COMMUNE_API_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Records endpoint of one dataset partition.
    pub fn records_url(&self, dataset: &str) -> String {
        format!(
            "{}/{}/records",
            self.base_url.as_str().trim_end_matches('/'),
            dataset
        )
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("🌐 Upstream API: {}", self.base_url);
        info!("   Request timeout: {}s", self.request_timeout.as_secs());
    }
}
