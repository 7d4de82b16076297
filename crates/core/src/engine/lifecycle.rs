//! Generation lifecycle: setup (install) and promotion (activate).

use futures_util::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};

use super::Engine;
use crate::Error;
use crate::request::Request;
use crate::response::Response;

/// Where an engine version is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Constructed, setup not yet run.
    Parsed,
    Installing,
    /// Precache complete; eligible for promotion.
    Installed,
    Activating,
    /// Handling interception events.
    Activated,
    /// Setup failed; this version will never be promoted.
    Redundant,
}

/// Outcome of a successful setup.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SetupReport {
    pub generation: String,
    /// Number of manifest entries stored.
    pub precached: usize,
    /// The namespace was already complete from an earlier run and nothing
    /// was fetched.
    pub reused: bool,
    /// The host should promote this version without a waiting phase.
    pub skip_waiting: bool,
}

/// Outcome of promotion.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PromoteReport {
    pub generation: String,
    /// Obsolete namespaces that were removed.
    pub deleted: Vec<String>,
    /// Obsolete namespaces whose deletion failed.
    pub failed: Vec<String>,
    /// The host should hand already-open clients to this version now.
    pub claim_clients: bool,
}

impl Engine {
    /// Open the generation's namespace and store the whole manifest.
    ///
    /// All manifest fetches must return a 2xx response; otherwise nothing
    /// is stored, the namespace stays not ready and this engine becomes
    /// [`Lifecycle::Redundant`]. A namespace already marked ready by an
    /// earlier run of the same generation is reused without fetching.
    pub async fn on_setup(&self) -> Result<SetupReport, Error> {
        self.transition(Lifecycle::Parsed, Lifecycle::Installing)
            .map_err(Error::InvalidState)?;
        tracing::info!(generation = %self.config.generation, "installing");

        match self.precache().await {
            Ok((precached, reused)) => {
                self.state.send_replace(Lifecycle::Installed);
                tracing::info!(generation = %self.config.generation, precached, reused, "installed");
                Ok(SetupReport { generation: self.config.generation.clone(), precached, reused, skip_waiting: true })
            }
            Err(e) => {
                self.state.send_replace(Lifecycle::Redundant);
                tracing::warn!(generation = %self.config.generation, error = %e, "install failed");
                Err(Error::SetupFailed(e.to_string()))
            }
        }
    }

    async fn precache(&self) -> Result<(usize, bool), Error> {
        let namespace = self.namespace();
        self.storage.open(namespace).await?;

        if self.storage.is_ready(namespace).await? {
            tracing::info!(namespace, "namespace already precached, reusing");
            return Ok((self.manifest.len(), true));
        }

        let responses = try_join_all(self.manifest.iter().map(|request| self.fetch_manifest_entry(request))).await?;
        let entries: Vec<(Request, Response)> = self.manifest.iter().cloned().zip(responses).collect();

        self.storage.seed(namespace, &entries).await?;
        Ok((entries.len(), false))
    }

    async fn fetch_manifest_entry(&self, request: &Request) -> Result<Response, Error> {
        let response = self.fetcher.fetch(request).await?;
        if !response.is_ok() {
            return Err(Error::HttpError(format!("{} returned status {}", request.url, response.status)));
        }
        Ok(response)
    }

    /// Delete every namespace other than the current generation's and start
    /// handling interception events.
    ///
    /// Deletions run independently; a failed one is reported in
    /// [`PromoteReport::failed`] and does not stop the others.
    pub async fn on_promote(&self) -> Result<PromoteReport, Error> {
        self.transition(Lifecycle::Installed, Lifecycle::Activating)
            .map_err(|state| Error::NotInstalled(format!("{} is {state}", self.config.generation)))?;
        tracing::info!(generation = %self.config.generation, "activating");

        let current = self.namespace();
        let names = self.storage.namespaces().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to list cache namespaces, skipping sweep");
            Vec::new()
        });

        let obsolete: Vec<String> = names.into_iter().filter(|name| name != current).collect();
        let results = join_all(obsolete.iter().map(|name| self.storage.delete(name))).await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in obsolete.into_iter().zip(results) {
            match result {
                Ok(_) => {
                    tracing::info!(namespace = %name, "deleted obsolete cache namespace");
                    deleted.push(name);
                }
                Err(e) => {
                    tracing::warn!(namespace = %name, error = %e, "failed to delete obsolete cache namespace");
                    failed.push(name);
                }
            }
        }

        self.state.send_replace(Lifecycle::Activated);
        tracing::info!(generation = %current, deleted = deleted.len(), "activated");

        Ok(PromoteReport { generation: current.to_string(), deleted, failed, claim_clients: true })
    }

    /// Move from `from` to `to`, or report the state actually found.
    fn transition(&self, from: Lifecycle, to: Lifecycle) -> Result<(), String> {
        let mut found = from;
        let moved = self.state.send_if_modified(|state| {
            found = *state;
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });
        if moved { Ok(()) } else { Err(format!("{found:?}").to_lowercase()) }
    }
}
