//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

const MAX_AGE_HOURS_LIMIT: u64 = 24 * 365;
const SWR_DAYS_LIMIT: u64 = 3650;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `base_url` is not an http(s) URL
    /// - `max_age_hours` is 0 or exceeds one year
    /// - any `*_swr_days` exceeds ten years
    ///
    /// Returns `ConfigError::Missing` if `running_version` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must be an http(s) URL".into() });
        }

        if self.running_version.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "running_version".into(),
                hint: "Set HOTFIX_RUNNING_VERSION environment variable".into(),
            });
        }

        if self.max_age_hours == 0 {
            return Err(ConfigError::Invalid { field: "max_age_hours".into(), reason: "must be at least 1".into() });
        }
        if self.max_age_hours > MAX_AGE_HOURS_LIMIT {
            return Err(ConfigError::Invalid {
                field: "max_age_hours".into(),
                reason: format!("must not exceed {MAX_AGE_HOURS_LIMIT}"),
            });
        }

        for (field, days) in [
            ("features_swr_days", self.features_swr_days),
            ("style_swr_days", self.style_swr_days),
            ("strings_swr_days", self.strings_swr_days),
        ] {
            if days > SWR_DAYS_LIMIT {
                return Err(ConfigError::Invalid { field: field.into(), reason: format!("must not exceed {SWR_DAYS_LIMIT}") });
            }
        }

        if self.development {
            tracing::warn!(
                running_version = %self.running_version,
                "development build; hotfixes will not be applied"
            );
        }

        Ok(())
    }
}
