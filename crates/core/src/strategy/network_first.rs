//! Network first, falling back to the cached request, then the shell.

use super::StrategyContext;
use crate::Error;
use crate::request::Request;
use crate::response::Response;

/// Fetch live and store a copy; when the network is unreachable serve the
/// cached copy of `request`, else the cached `shell`.
///
/// HTTP error statuses are live responses and are stored like any other.
/// A live body over the fetcher's size limit counts as a network failure.
pub async fn network_first(ctx: StrategyContext, request: Request, shell: Request) -> Result<Response, Error> {
    let err = match ctx.fetcher.fetch(&request).await {
        Ok(response) => {
            ctx.store(&request, &response).await;
            return Ok(response);
        }
        Err(err) => err,
    };

    if matches!(err, Error::FetchTooLarge(_)) {
        tracing::warn!(url = %request.url, error = %err, "live response too large, falling back to cache");
    } else {
        tracing::debug!(url = %request.url, error = %err, "network failed, falling back to cache");
    }

    if let Some(cached) = ctx.lookup(&request).await {
        return Ok(cached);
    }

    if let Some(shell_response) = ctx.lookup(&shell).await {
        tracing::debug!(url = %request.url, shell = %shell.url, "serving application shell");
        return Ok(shell_response);
    }

    Err(Error::Unresolvable(format!("{}: {err}", request.url)))
}
