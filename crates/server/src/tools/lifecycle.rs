//! install and activate tool implementations.
//!
//! Dispatch the setup and promotion lifecycle events to the engine.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use swcache_core::{Engine, Error};

fn to_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the install tool.
pub async fn install_impl(engine: &Engine) -> Result<CallToolResult, McpError> {
    let report = engine.on_setup().await?;
    to_result(&report)
}

/// Implementation of the activate tool.
pub async fn activate_impl(engine: &Engine) -> Result<CallToolResult, McpError> {
    let report = engine.on_promote().await?;
    to_result(&report)
}
