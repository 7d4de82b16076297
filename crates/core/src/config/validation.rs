//! Configuration validation rules.
//!
//! This module provides validation logic for `EngineConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::EngineConfig;
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

impl EngineConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the generation or manifest is empty,
    /// and `ConfigError::Invalid` if:
    /// - `origin` is not an http(s) URL
    /// - a manifest path does not start with `/`
    /// - `shell_path` is not part of the manifest
    /// - an asset extension is empty or not alphanumeric
    /// - a trusted host is empty or not lowercase
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "generation".into(),
                hint: "Set SWCACHE_GENERATION to the deployment's cache tag".into(),
            });
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) URL".into() });
        }

        if self.precache.is_empty() {
            return Err(ConfigError::Missing {
                field: "precache".into(),
                hint: "List the application shell paths to cache at setup".into(),
            });
        }
        if let Some(path) = self.precache.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid { field: "precache".into(), reason: format!("{path} must start with /") });
        }

        if !self.precache.contains(&self.shell_path) {
            return Err(ConfigError::Invalid {
                field: "shell_path".into(),
                reason: format!("{} is not in the precache manifest", self.shell_path),
            });
        }

        if let Some(ext) = self
            .asset_extensions
            .iter()
            .find(|e| e.is_empty() || !e.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(ConfigError::Invalid {
                field: "asset_extensions".into(),
                reason: format!("{ext:?} must be a bare alphanumeric extension"),
            });
        }

        if let Some(host) = self
            .trusted_hosts
            .iter()
            .find(|h| h.is_empty() || h.chars().any(|c| c.is_ascii_uppercase()))
        {
            return Err(ConfigError::Invalid {
                field: "trusted_hosts".into(),
                reason: format!("{host:?} must be a non-empty lowercase host"),
            });
        }

        if self.asset_extensions.is_empty() && self.trusted_hosts.is_empty() {
            tracing::warn!("No asset extensions or trusted hosts configured; stale-while-revalidate is disabled");
        }

        Ok(())
    }
}
