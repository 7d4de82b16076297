//! swcache-mcp server entry point.
//!
//! Boots one engine generation from configuration and serves its lifecycle
//! and interception events as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchConfig, NetworkFetcher};
use swcache_core::{CacheDb, Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = EngineConfig::load()?;
    let cache = CacheDb::open(&config.db_path).await?;
    let fetcher = NetworkFetcher::new(FetchConfig::default(), config.origin_url()?)?;
    let engine = Engine::new(config, Arc::new(cache.clone()), Arc::new(fetcher))?;

    let mut lifecycle = engine.subscribe();
    tokio::spawn(async move {
        while lifecycle.changed().await.is_ok() {
            let state = *lifecycle.borrow_and_update();
            tracing::info!(?state, "engine lifecycle changed");
        }
    });

    tracing::info!(generation = engine.namespace(), "Starting swcache-mcp server on stdio transport");

    let handler = handler::SwcacheServer::new(Arc::new(engine), cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
