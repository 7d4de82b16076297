//! Engine configuration with layered loading.
//!
//! The engine only ever sees a constructed [`EngineConfig`]; it never reads
//! the environment itself. Hosts build one with [`EngineConfig::load`], which
//! uses figment to layer:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::request::Request;

mod validation;

pub use validation::ConfigError;

/// Configuration for one generation of the interception engine.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Generation identifier; also the name of the cache namespace.
    ///
    /// Set via SWCACHE_GENERATION environment variable.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Origin the application is served from. Manifest paths resolve
    /// against it.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Application shell paths that must be cached before setup completes.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Manifest path served for navigations that miss both network and cache.
    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    /// File extensions routed to stale-while-revalidate.
    #[serde(default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,

    /// Third-party hosts whose responses are treated as versioned assets.
    /// Subdomains of a listed host match too.
    #[serde(default = "default_trusted_hosts")]
    pub trusted_hosts: Vec<String>,

    /// Path to the SQLite cache database.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_generation() -> String {
    "swcache-v1".into()
}

fn default_origin() -> String {
    "http://localhost:5173/".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/index.html", "/logo.svg", "/logo.ico", "/manifest.json"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_shell_path() -> String {
    "/index.html".into()
}

fn default_asset_extensions() -> Vec<String> {
    ["js", "css", "png", "jpg", "jpeg", "svg", "woff", "woff2", "ttf", "eot"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_trusted_hosts() -> Vec<String> {
    ["fonts.googleapis.com", "gstatic.com", "cdn.tailwindcss.com", "imgur.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation: default_generation(),
            origin: default_origin(),
            precache: default_precache(),
            shell_path: default_shell_path(),
            asset_extensions: default_asset_extensions(),
            trusted_hosts: default_trusted_hosts(),
            db_path: default_db_path(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// GET requests for every manifest path, in manifest order.
    pub fn precache_requests(&self) -> Result<Vec<Request>, ConfigError> {
        let origin = self.origin_url()?;
        self.precache.iter().map(|path| resolve_path(&origin, "precache", path)).collect()
    }

    /// GET request for the offline navigation fallback.
    pub fn shell_request(&self) -> Result<Request, ConfigError> {
        let origin = self.origin_url()?;
        resolve_path(&origin, "shell_path", &self.shell_path)
    }
}

fn resolve_path(origin: &Url, field: &str, path: &str) -> Result<Request, ConfigError> {
    origin
        .join(path)
        .map(Request::get)
        .map_err(|e| ConfigError::Invalid { field: field.into(), reason: format!("{path}: {e}") })
}
