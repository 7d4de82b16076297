//! Caching strategies executed for intercepted requests.

mod network_first;
mod stale_while_revalidate;

use std::sync::Arc;

pub use network_first::network_first;
pub use stale_while_revalidate::stale_while_revalidate;

use crate::cache::CacheStorage;
use crate::fetch::Fetcher;
use crate::request::Request;
use crate::response::Response;

/// Collaborators shared by every strategy run.
#[derive(Clone)]
pub struct StrategyContext {
    /// Current generation's namespace.
    pub namespace: Arc<str>,
    pub storage: Arc<dyn CacheStorage>,
    pub fetcher: Arc<dyn Fetcher>,
}

impl StrategyContext {
    /// Cache lookup where a storage failure counts as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.storage.lookup(&self.namespace, request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Store a response; failures are logged and never reach the caller.
    async fn store(&self, request: &Request, response: &Response) {
        if let Err(e) = self.storage.put(&self.namespace, request, response).await {
            tracing::warn!(url = %request.url, error = %e, "failed to store response");
        }
    }
}
