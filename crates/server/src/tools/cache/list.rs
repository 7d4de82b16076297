//! cache_list tool implementation.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CacheDb, Engine, Error, Lifecycle, NamespaceSummary};

/// Output structure for cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Namespace owned by the running generation.
    pub current: String,
    pub lifecycle: Lifecycle,
    /// Background asset refreshes still in flight.
    pub pending_refreshes: usize,
    pub namespaces: Vec<NamespaceSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(cache: &CacheDb, engine: &Engine) -> Result<CallToolResult, McpError> {
    let namespaces = cache.namespace_summaries().await?;
    tracing::debug!("listed {} namespaces", namespaces.len());

    let output = CacheListOutput {
        current: engine.namespace().to_string(),
        lifecycle: engine.lifecycle(),
        pending_refreshes: engine.pending_refreshes(),
        namespaces,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
