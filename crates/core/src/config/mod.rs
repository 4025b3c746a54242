//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (BANNER_*)
//! 2. TOML config file (if BANNER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (BANNER_*)
/// 2. TOML config file (if BANNER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base of the remote directory listing; the category directory is appended.
    ///
    /// Set via BANNER_LISTING_BASE_URL environment variable.
    #[serde(default = "default_listing_base_url")]
    pub listing_base_url: String,

    /// Raw-content base used when a listing entry has no `download_url`.
    ///
    /// Set via BANNER_RAW_BASE_URL environment variable.
    #[serde(default = "default_raw_base_url")]
    pub raw_base_url: String,

    /// Directory holding general-audience wallpapers.
    #[serde(default = "default_general_category")]
    pub general_category: String,

    /// Directory holding restricted wallpapers, merged in extended mode.
    #[serde(default = "default_restricted_category")]
    pub restricted_category: String,

    /// Named-API list consumed by catalog mode.
    ///
    /// Set via BANNER_API_LIST_URL environment variable.
    #[serde(default = "default_api_list_url")]
    pub api_list_url: String,

    /// Listing snapshot time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Upper bound on catalog-mode draws before giving up on unseen content.
    #[serde(default = "default_max_catalog_attempts")]
    pub max_catalog_attempts: usize,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Maximum body bytes accepted per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Whether listing mode merges the restricted category by default.
    ///
    /// Set via BANNER_EXTENDED environment variable.
    #[serde(default)]
    pub extended: bool,
}

fn default_listing_base_url() -> String {
    "https://api.github.com/repos/SevenOnePlus/Banner-Down/contents".into()
}

fn default_raw_base_url() -> String {
    "https://raw.githubusercontent.com/SevenOnePlus/Banner-Down/main".into()
}

fn default_general_category() -> String {
    "Normal".into()
}

fn default_restricted_category() -> String {
    "R18".into()
}

fn default_api_list_url() -> String {
    "https://folkbanner.example.com/api.php".into()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_max_catalog_attempts() -> usize {
    10
}

fn default_user_agent() -> String {
    "banner/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listing_base_url: default_listing_base_url(),
            raw_base_url: default_raw_base_url(),
            general_category: default_general_category(),
            restricted_category: default_restricted_category(),
            api_list_url: default_api_list_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_catalog_attempts: default_max_catalog_attempts(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            extended: false,
        }
    }
}

impl AppConfig {
    /// Total request timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `BANNER_`
    /// 2. TOML file from `BANNER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("BANNER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("BANNER_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
