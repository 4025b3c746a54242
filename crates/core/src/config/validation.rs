//! Configuration validation rules.
//!
//! Runs after `AppConfig` has been assembled from environment, file, and
//! defaults.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(field, format!("unsupported scheme {other}"))),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any endpoint is not an absolute http(s) URL
    /// - a category directory is empty or both categories are the same
    /// - `max_catalog_attempts` is 0 or exceeds 100
    /// - `timeout_ms` is outside 100ms..=5 minutes
    /// - `max_bytes` is 0 or exceeds 100MB
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_http_url("listing_base_url", &self.listing_base_url)?;
        require_http_url("raw_base_url", &self.raw_base_url)?;
        require_http_url("api_list_url", &self.api_list_url)?;

        if self.general_category.trim().is_empty() {
            return Err(invalid("general_category", "must not be empty"));
        }
        if self.restricted_category.trim().is_empty() {
            return Err(invalid("restricted_category", "must not be empty"));
        }
        if self.general_category == self.restricted_category {
            return Err(invalid("restricted_category", "must differ from general_category"));
        }

        if self.max_catalog_attempts == 0 || self.max_catalog_attempts > 100 {
            return Err(invalid("max_catalog_attempts", "must be between 1 and 100"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }
        if self.connect_timeout_ms == 0 || self.connect_timeout_ms > self.timeout_ms {
            return Err(invalid("connect_timeout_ms", "must be positive and not exceed timeout_ms"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 100 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 100MB"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.cache_ttl_secs == 0 {
            tracing::warn!("cache_ttl_secs is 0; every listing request will hit the network");
        }

        Ok(())
    }
}
