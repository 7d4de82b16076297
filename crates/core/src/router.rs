//! Request classification.
//!
//! Rules are checked in priority order and the first match wins:
//!
//! 1. Non-GET methods and non-network schemes are ignored.
//! 2. Navigations go network-first.
//! 3. Paths with a static asset extension, or hosts on the trusted list, go
//!    stale-while-revalidate.
//! 4. Everything else passes through untouched.

use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::config::EngineConfig;
use crate::request::Request;

/// Handling strategy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Ignore,
    Navigation,
    Asset,
    Passthrough,
}

/// Compiled routing rules.
#[derive(Debug, Clone)]
pub struct Router {
    asset_path: Option<Regex>,
    trusted_hosts: Vec<String>,
}

impl Router {
    /// Build a router from the configured extensions and hosts.
    pub fn new(config: &EngineConfig) -> Result<Self, Error> {
        let asset_path = if config.asset_extensions.is_empty() {
            None
        } else {
            let alternation = config
                .asset_extensions
                .iter()
                .map(|ext| regex::escape(ext))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"\.({alternation})$");
            Some(Regex::new(&pattern).map_err(|e| Error::InvalidInput(format!("asset pattern: {e}")))?)
        };

        Ok(Self { asset_path, trusted_hosts: config.trusted_hosts.clone() })
    }

    pub fn classify(&self, request: &Request) -> Route {
        if request.method != Method::GET || !request.has_network_scheme() {
            return Route::Ignore;
        }

        if request.is_navigation() {
            return Route::Navigation;
        }

        if self.is_asset_path(request.url.path()) || request.url.host_str().is_some_and(|h| self.is_trusted_host(h)) {
            return Route::Asset;
        }

        Route::Passthrough
    }

    fn is_asset_path(&self, path: &str) -> bool {
        self.asset_path.as_ref().is_some_and(|re| re.is_match(path))
    }

    /// Exact host or any subdomain of a trusted host.
    fn is_trusted_host(&self, host: &str) -> bool {
        self.trusted_hosts.iter().any(|trusted| {
            host == trusted
                || host
                    .strip_suffix(trusted.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
