//! Stale-while-revalidate for versioned assets.

use tokio::sync::oneshot;
use tokio_util::task::TaskTracker;

use super::StrategyContext;
use crate::Error;
use crate::request::Request;
use crate::response::Response;

/// Serve the cached copy immediately when there is one, and refresh it from
/// the network in a task spawned on `refreshes`.
///
/// The refresh outlives the returned future: a cache hit, or a caller that
/// stops waiting, never cancels it. On a miss the caller receives the
/// network response once the store attempt has finished.
pub async fn stale_while_revalidate(
    ctx: StrategyContext, request: Request, refreshes: TaskTracker,
) -> Result<Response, Error> {
    // Looked up before the refresh starts, so a fast refresh cannot replace
    // the entry this call answers with.
    let cached = ctx.lookup(&request).await;

    let (tx, rx) = oneshot::channel();
    let refresh_request = request.clone();
    refreshes.spawn(async move {
        let result = revalidate(&ctx, &refresh_request).await;
        let _ = tx.send(result);
    });

    if let Some(response) = cached {
        tracing::debug!(url = %request.url, "serving cached asset, refreshing in background");
        return Ok(response);
    }

    match rx.await {
        Ok(result) => result.map_err(|e| Error::Unresolvable(format!("{}: {e}", request.url))),
        Err(_) => Err(Error::Unresolvable(format!("{}: refresh task aborted", request.url))),
    }
}

async fn revalidate(ctx: &StrategyContext, request: &Request) -> Result<Response, Error> {
    let response = ctx.fetcher.fetch(request).await.inspect_err(|e| {
        tracing::debug!(url = %request.url, error = %e, "asset refresh failed");
    })?;

    if response.is_revalidation_eligible() {
        ctx.store(request, &response).await;
    } else {
        tracing::debug!(
            url = %request.url,
            status = response.status,
            kind = response.kind.as_str(),
            redirected = response.redirected,
            "not caching asset response"
        );
    }

    Ok(response)
}
