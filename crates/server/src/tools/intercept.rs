//! intercept tool implementation.
//!
//! Dispatches one outgoing request to the engine the way a page would issue
//! it, and reports how the engine handled it.

use http::Method;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Engine, Error, Lifecycle, Request, RequestMode, Response, ResponseKind, Route};

use crate::error::HostError;

/// Input parameters for intercept tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterceptParams {
    /// Request URL, absolute or relative to the application origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin" (default), "cors" or "no-cors".
    #[serde(default)]
    pub mode: RequestMode,

    /// Wait for background refreshes before returning.
    #[serde(default)]
    pub settle: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Summary of the response supplied to the page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseSummary {
    pub url: String,
    pub status: u16,
    pub kind: ResponseKind,
    pub redirected: bool,
    pub content_type: Option<String>,
    /// Body as text when it is valid UTF-8.
    pub body: Option<String>,
    pub body_bytes: usize,
}

impl From<Response> for ResponseSummary {
    fn from(response: Response) -> Self {
        Self {
            url: response.url.to_string(),
            status: response.status,
            kind: response.kind,
            redirected: response.redirected,
            content_type: response.content_type().map(str::to_string),
            body: std::str::from_utf8(&response.body).ok().map(str::to_string),
            body_bytes: response.body.len(),
        }
    }
}

/// Output structure for intercept tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterceptOutput {
    /// The resolved request URL.
    pub url: String,
    pub route: Route,
    pub lifecycle: Lifecycle,
    /// The engine left the request to default network handling.
    pub declined: bool,
    pub response: Option<ResponseSummary>,
    /// Set when neither the network nor the cache could answer.
    pub error: Option<String>,
}

fn parse_method(method: &str) -> Result<Method, HostError> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| HostError::InvalidInput(format!("invalid method: {method}")))
}

/// Implementation of the intercept tool.
pub async fn intercept_impl(engine: &Engine, params: InterceptParams) -> Result<CallToolResult, McpError> {
    let origin = engine.config().origin_url().map_err(Error::from)?;
    let url = swcache_client::resolve(&params.url, &origin).map_err(|e| HostError::InvalidUrl(e.to_string()))?;
    let request = Request::new(parse_method(&params.method)?, url, params.mode);

    let route = engine.route(&request);
    let mut output = InterceptOutput {
        url: request.url.to_string(),
        route,
        lifecycle: engine.lifecycle(),
        declined: true,
        response: None,
        error: None,
    };

    if let Some(pending) = engine.on_intercept(request) {
        output.declined = false;
        match pending.await {
            Ok(response) => output.response = Some(response.into()),
            Err(e) => output.error = Some(e.to_string()),
        }
    }

    if params.settle {
        engine.settle().await;
    }

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
