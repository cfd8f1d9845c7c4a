//! Client configuration
//!
//! Loaded from an optional JSON file, then overridden by `SMARTBI_*`
//! environment variables.

use crate::api::types::{SearchParams, SortOrder};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const ENV_BASE_URL: &str = "SMARTBI_BASE_URL";
pub const ENV_SESSION_COOKIE: &str = "SMARTBI_SESSION_COOKIE";
pub const ENV_TIMEOUT_SECS: &str = "SMARTBI_TIMEOUT_SECS";
pub const ENV_PAGE_SIZE: &str = "SMARTBI_PAGE_SIZE";
pub const ENV_REFRESH_SECS: &str = "SMARTBI_REFRESH_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chart service, including its API prefix
    pub base_url: String,
    /// Already-issued session cookie, sent verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    /// Request timeout; synchronous generation can take a while
    pub timeout_secs: u64,
    pub page_size: u64,
    pub sort_field: String,
    pub sort_order: SortOrder,
    /// Re-fetch interval while pending jobs are listed; `None` means manual refresh
    pub refresh_interval_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8101/api".to_string(),
            session_cookie: None,
            timeout_secs: 120,
            page_size: 4,
            sort_field: "createTime".to_string(),
            sort_order: SortOrder::Desc,
            refresh_interval_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load from `path` (if any) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            AppError::Config(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(cookie) = lookup(ENV_SESSION_COOKIE) {
            self.session_cookie = Some(cookie).filter(|c| !c.trim().is_empty());
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_number(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            self.page_size = parse_number(ENV_PAGE_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_REFRESH_SECS) {
            let secs = parse_number(ENV_REFRESH_SECS, &value)?;
            self.refresh_interval_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "Base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("Timeout must be positive".to_string()));
        }
        if self.page_size == 0 {
            return Err(AppError::Config("Page size must be positive".to_string()));
        }
        if self.refresh_interval_secs == Some(0) {
            return Err(AppError::Config("Refresh interval must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs.map(Duration::from_secs)
    }

    /// Listing parameters a filter resets to
    pub fn baseline_params(&self) -> SearchParams {
        SearchParams::baseline(self.page_size, self.sort_field.clone(), self.sort_order)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{} must be a number: {}", key, e)))
}
