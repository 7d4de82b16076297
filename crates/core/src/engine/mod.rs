//! The interception policy engine.
//!
//! The host drives the engine through three entry points:
//!
//! - [`Engine::on_setup`] once per new version (install)
//! - [`Engine::on_promote`] once when the version takes control (activate)
//! - [`Engine::on_intercept`] for every outgoing request afterwards
//!
//! Interception is only active after promotion; before that, and for any
//! request the router does not claim, the engine declines and the host's
//! default network handling applies.

mod lifecycle;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio_util::task::TaskTracker;

pub use lifecycle::{Lifecycle, PromoteReport, SetupReport};

use crate::Error;
use crate::cache::CacheStorage;
use crate::config::EngineConfig;
use crate::fetch::Fetcher;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};
use crate::strategy::{StrategyContext, network_first, stale_while_revalidate};

/// Response supplied for an intercepted request.
pub type ResponseFuture = BoxFuture<'static, Result<Response, Error>>;

/// One generation of the interception engine.
pub struct Engine {
    config: EngineConfig,
    router: Router,
    manifest: Vec<Request>,
    shell: Request,
    namespace: Arc<str>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    state: watch::Sender<Lifecycle>,
    refreshes: TaskTracker,
}

impl Engine {
    /// Build an engine for the configured generation.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration fails validation.
    pub fn new(
        config: EngineConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let router = Router::new(&config)?;
        let manifest = config.precache_requests()?;
        let shell = config.shell_request()?;
        let namespace: Arc<str> = config.generation.as_str().into();
        let (state, _) = watch::channel(Lifecycle::Parsed);

        Ok(Self { config, router, manifest, shell, namespace, storage, fetcher, state, refreshes: TaskTracker::new() })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Namespace owned by this generation.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.state.borrow()
    }

    /// Receiver notified on every lifecycle transition.
    pub fn subscribe(&self) -> watch::Receiver<Lifecycle> {
        self.state.subscribe()
    }

    /// How `request` would be handled once the engine is active.
    pub fn route(&self, request: &Request) -> Route {
        self.router.classify(request)
    }

    /// Decide whether to answer `request`.
    ///
    /// Returns `None` to decline, leaving the request to the host's default
    /// handling. Otherwise the returned future resolves to the response for
    /// the caller, or to `Error::Unresolvable` when neither the network nor
    /// the cache can answer.
    pub fn on_intercept(&self, request: Request) -> Option<ResponseFuture> {
        if self.lifecycle() != Lifecycle::Activated {
            tracing::debug!(url = %request.url, "engine not active, declining");
            return None;
        }

        let route = self.router.classify(&request);
        tracing::debug!(method = %request.method, url = %request.url, ?route, "classified request");

        match route {
            Route::Ignore | Route::Passthrough => None,
            Route::Navigation => Some(Box::pin(network_first(self.context(), request, self.shell.clone()))),
            Route::Asset => Some(Box::pin(stale_while_revalidate(self.context(), request, self.refreshes.clone()))),
        }
    }

    /// Wait until every background refresh spawned so far has finished.
    pub async fn settle(&self) {
        self.refreshes.close();
        self.refreshes.wait().await;
        self.refreshes.reopen();
    }

    /// Background refreshes still running.
    pub fn pending_refreshes(&self) -> usize {
        self.refreshes.len()
    }

    fn context(&self) -> StrategyContext {
        StrategyContext {
            namespace: self.namespace.clone(),
            storage: self.storage.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDb;
    use crate::request::RequestMode;
    use crate::response::ResponseKind;
    use crate::testing::{ORIGIN, ScriptedFetcher, url};
    use http::Method;
    use url::Url;

    const GENERATION: &str = "app-v3";

    fn config() -> EngineConfig {
        EngineConfig { generation: GENERATION.into(), origin: ORIGIN.into(), ..Default::default() }
    }

    async fn active_engine() -> (Engine, CacheDb, Arc<ScriptedFetcher>) {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("app-v2").await.unwrap();
        let fetcher = ScriptedFetcher::new();
        fetcher.respond_ok(&url("/"), "<html>root</html>");
        fetcher.respond_ok(&url("/index.html"), "<html>shell</html>");
        fetcher.respond_ok(&url("/logo.svg"), "<svg/>");
        fetcher.respond_ok(&url("/logo.ico"), "ico");
        fetcher.respond_ok(&url("/manifest.json"), "{}");

        let engine = Engine::new(config(), Arc::new(db.clone()), fetcher.clone()).unwrap();
        engine.on_setup().await.unwrap();
        engine.on_promote().await.unwrap();
        (engine, db, fetcher)
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let bad = EngineConfig { shell_path: "/elsewhere.html".into(), ..config() };
        let result = Engine::new(bad, Arc::new(db), ScriptedFetcher::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_namespace_singleton_after_promotion() {
        let (engine, db, _) = active_engine().await;
        assert_eq!(db.namespace_names().await.unwrap(), vec![GENERATION.to_string()]);
        assert_eq!(engine.namespace(), GENERATION);
    }

    #[tokio::test]
    async fn test_declines_before_promotion() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let engine = Engine::new(config(), Arc::new(db), ScriptedFetcher::new()).unwrap();
        assert!(engine.on_intercept(Request::navigate(url("/about"))).is_none());
        assert_eq!(engine.route(&Request::navigate(url("/about"))), Route::Navigation);
    }

    #[tokio::test]
    async fn test_subscribe_sees_activation() {
        let (engine, _, _) = active_engine().await;
        let rx = engine.subscribe();
        assert_eq!(*rx.borrow(), Lifecycle::Activated);
    }

    #[tokio::test]
    async fn test_navigation_returns_live_and_stores() {
        let (engine, db, fetcher) = active_engine().await;
        let page = url("/reports");
        fetcher.respond_ok(&page, "<html>reports</html>");
        let request = Request::navigate(page);

        let response = engine.on_intercept(request.clone()).unwrap().await.unwrap();
        assert_eq!(response.body, "<html>reports</html>");

        let stored = db.match_entry(GENERATION, &request).await.unwrap().unwrap();
        assert_eq!(stored, response);
    }

    #[tokio::test]
    async fn test_navigation_offline_serves_shell() {
        let (engine, db, _) = active_engine().await;
        let shell = db
            .match_entry(GENERATION, &Request::get(url("/index.html")))
            .await
            .unwrap()
            .unwrap();

        let response = engine
            .on_intercept(Request::navigate(url("/deep/link/7")))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(response, shell);
    }

    #[tokio::test]
    async fn test_asset_hit_serves_cache_then_updates() {
        let (engine, db, fetcher) = active_engine().await;
        let asset = url("/assets/index-a1b2.js");
        let request = Request::new(Method::GET, asset.clone(), RequestMode::Cors);
        let cached = Response::basic(asset.clone(), 200, "cached bundle");
        db.put_entry(GENERATION, &request, &cached).await.unwrap();
        fetcher.respond_ok(&asset, "fresh bundle");

        let response = engine.on_intercept(request.clone()).unwrap().await.unwrap();
        assert_eq!(response.body, cached.body);

        engine.settle().await;
        assert_eq!(engine.pending_refreshes(), 0);
        let stored = db.match_entry(GENERATION, &request).await.unwrap().unwrap();
        assert_eq!(stored.body, "fresh bundle");
    }

    #[tokio::test]
    async fn test_asset_miss_serves_network_and_stores() {
        let (engine, db, fetcher) = active_engine().await;
        let font = Url::parse("https://fonts.gstatic.com/s/inter/v12/inter.woff2").unwrap();
        let request = Request::new(Method::GET, font.clone(), RequestMode::Cors);
        fetcher.respond(&font, Response { kind: ResponseKind::Cors, ..Response::basic(font.clone(), 200, "woff2") });

        let response = engine.on_intercept(request.clone()).unwrap().await.unwrap();
        assert_eq!(response.body, "woff2");
        assert!(db.match_entry(GENERATION, &request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_post_declined() {
        let (engine, db, fetcher) = active_engine().await;
        let request = Request::new(Method::POST, url("/api/save"), RequestMode::Cors);
        let calls_before = fetcher.calls().len();

        assert!(engine.on_intercept(request.clone()).is_none());
        assert_eq!(fetcher.calls().len(), calls_before);
        assert!(db.match_entry(GENERATION, &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unmatched_declined() {
        let (engine, _, _) = active_engine().await;
        assert!(engine.on_intercept(Request::get(url("/api/users"))).is_none());
    }

    #[tokio::test]
    async fn test_opaque_asset_not_cached() {
        let (engine, db, fetcher) = active_engine().await;
        let image = Url::parse("https://i.imgur.com/banner.png").unwrap();
        let request = Request::new(Method::GET, image.clone(), RequestMode::NoCors);
        fetcher.respond(&image, Response::opaque(image.clone()));

        let response = engine.on_intercept(request.clone()).unwrap().await.unwrap();
        assert_eq!(response.kind, ResponseKind::Opaque);

        engine.settle().await;
        assert!(db.match_entry(GENERATION, &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_navigation_to_asset_path_is_network_first() {
        let (engine, db, fetcher) = active_engine().await;
        let page = url("/docs/diagram.svg");
        fetcher.respond(&page, Response::basic(page.clone(), 404, "missing"));
        let request = Request::navigate(page);

        let response = engine.on_intercept(request.clone()).unwrap().await.unwrap();
        assert_eq!(response.status, 404);
        // Stale-while-revalidate would have refused to store a 404.
        assert!(db.match_entry(GENERATION, &request).await.unwrap().is_some());
    }
}
