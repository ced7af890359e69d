//! Configuration validation rules.

use crate::config::AppConfig;
use crate::keys::decode_application_server_key;
use thiserror::Error;

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
    /// Returns `ConfigError::Missing` if `cache_version` or `static_assets`
    /// is empty, and `ConfigError::Invalid` if:
    /// - a static asset is not root-relative
    /// - `origin` is not an http(s) URL
    /// - `application_server_key` does not decode to a P-256 point
    /// - `fetch_timeout_ms` is below 100ms
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_version".into(),
                hint: "Set CENDRES_CACHE_VERSION to a non-empty version tag".into(),
            });
        }

        if self.static_assets.is_empty() {
            return Err(ConfigError::Missing {
                field: "static_assets".into(),
                hint: "List at least the app shell path \"/\"".into(),
            });
        }
        if let Some(bad) = self.static_assets.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "static_assets".into(),
                reason: format!("{bad:?} is not root-relative"),
            });
        }
        if !self.static_assets.iter().any(|p| p == "/") {
            tracing::warn!("static_assets does not include \"/\"; offline navigations will have no fallback");
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {}", origin.scheme()),
            });
        }

        decode_application_server_key(&self.application_server_key).map_err(|e| ConfigError::Invalid {
            field: "application_server_key".into(),
            reason: e.to_string(),
        })?;

        if let Some(ms) = self.fetch_timeout_ms
            && ms < 100
        {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}
