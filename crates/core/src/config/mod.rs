//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HOTFIX_*)
//! 2. TOML config file (if HOTFIX_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::RefreshPolicy;

mod validation;

pub use validation::ConfigError;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HOTFIX_*)
/// 2. TOML config file (if HOTFIX_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via HOTFIX_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL every hotfix resource path is resolved against.
    ///
    /// Set via HOTFIX_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per hotfix resource.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Version of the running build, compared against hotfix thresholds.
    ///
    /// Set via HOTFIX_RUNNING_VERSION environment variable.
    #[serde(default = "default_running_version")]
    pub running_version: String,

    /// Treat the running build as a development build (no hotfixes applied).
    #[serde(default)]
    pub development: bool,

    /// Running against an enterprise deployment (no style or string hotfixes).
    #[serde(default)]
    pub enterprise: bool,

    /// Hours a cached hotfix is served without refreshing.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,

    /// Days a stale broken-features list is still served.
    #[serde(default = "default_swr_days")]
    pub features_swr_days: u64,

    /// Days a stale style patch is still served.
    #[serde(default = "default_style_swr_days")]
    pub style_swr_days: u64,

    /// Days a stale string table is still served.
    #[serde(default = "default_swr_days")]
    pub strings_swr_days: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./hotfix-cache.sqlite")
}

fn default_base_url() -> String {
    "https://refined-github.github.io/yolo/".into()
}

fn default_user_agent() -> String {
    "hotfix/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_running_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

fn default_max_age_hours() -> u64 {
    6
}

fn default_swr_days() -> u64 {
    30
}

fn default_style_swr_days() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            running_version: default_running_version(),
            development: false,
            enterprise: false,
            max_age_hours: default_max_age_hours(),
            features_swr_days: default_swr_days(),
            style_swr_days: default_style_swr_days(),
            strings_swr_days: default_swr_days(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Refresh policy for the broken-features list.
    pub fn features_policy(&self) -> RefreshPolicy {
        self.policy(self.features_swr_days)
    }

    /// Refresh policy for per-version style patches.
    pub fn style_policy(&self) -> RefreshPolicy {
        self.policy(self.style_swr_days)
    }

    /// Refresh policy for the string-replacement table.
    pub fn strings_policy(&self) -> RefreshPolicy {
        self.policy(self.strings_swr_days)
    }

    fn policy(&self, swr_days: u64) -> RefreshPolicy {
        RefreshPolicy::new(
            Duration::from_secs(self.max_age_hours.saturating_mul(HOUR)),
            Duration::from_secs(swr_days.saturating_mul(DAY)),
        )
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HOTFIX_`
    /// 2. TOML file from `HOTFIX_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("HOTFIX_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HOTFIX_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
