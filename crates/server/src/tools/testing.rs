//! Shared fixtures for tool tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use swcache_core::{CacheDb, Engine, EngineConfig, Error, Fetcher, Request, Response};
use url::Url;

pub const ORIGIN: &str = "https://app.test/";

/// Bodies for the default precache manifest.
pub const MANIFEST: &[(&str, &str)] = &[
    ("/", "root"),
    ("/index.html", "<html>shell</html>"),
    ("/logo.svg", "<svg/>"),
    ("/logo.ico", "ico"),
    ("/manifest.json", "{}"),
];

/// Fetcher serving fixed bodies by path on [`ORIGIN`]; anything else is offline.
pub struct StaticFetcher {
    pages: HashMap<String, &'static str>,
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        match self.pages.get(request.url.as_str()) {
            Some(body) => Ok(Response::basic(request.url.clone(), 200, *body)),
            None => Err(Error::Network(format!("{}: offline", request.url))),
        }
    }
}

pub async fn engine_with(pages: &[(&str, &'static str)]) -> (Arc<Engine>, CacheDb) {
    let origin = Url::parse(ORIGIN).unwrap();
    let pages = pages
        .iter()
        .map(|(path, body)| (origin.join(path).unwrap().to_string(), *body))
        .collect();
    let db = CacheDb::open_in_memory().await.unwrap();
    let config = EngineConfig { generation: "app-v1".into(), origin: ORIGIN.into(), ..Default::default() };
    let engine = Engine::new(config, Arc::new(db.clone()), Arc::new(StaticFetcher { pages })).unwrap();
    (Arc::new(engine), db)
}

pub fn text_of(result: &CallToolResult) -> String {
    result.content[0].as_text().unwrap().text.clone()
}
