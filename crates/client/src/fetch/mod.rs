//! Live network fetcher for the interception engine.
//!
//! ### Response classification
//! - Same origin as the application: `basic`
//! - Cross-origin `no-cors` request: `opaque` (status 0, no headers, no body)
//! - Any other cross-origin request: `cors`
//!
//! ### Limits
//! - Max redirects: 5 (configurable); the final URL is kept and the
//!   response is flagged as redirected
//! - Max body bytes: 20MB (configurable)
//! - No request timeout unless one is configured

pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use swcache_core::{Error, Fetcher, Request, RequestMode, Response, ResponseKind};

pub use self::url::{UrlError, resolve};

/// Configuration for the network fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 20MB)
    pub max_bytes: usize,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "swcache/0.1".to_string(), max_bytes: 20 * 1024 * 1024, timeout: None, max_redirects: 5 }
    }
}

/// Fetcher backed by reqwest.
pub struct NetworkFetcher {
    http: Client,
    config: FetchConfig,
    origin: ::url::Url,
}

impl NetworkFetcher {
    /// Create a fetcher for an application served from `origin`.
    pub fn new(config: FetchConfig, origin: ::url::Url) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, origin })
    }

    fn classify(&self, request: &Request) -> ResponseKind {
        if request.url.origin() == self.origin.origin() {
            ResponseKind::Basic
        } else if request.mode == RequestMode::NoCors {
            ResponseKind::Opaque
        } else {
            ResponseKind::Cors
        }
    }
}

#[async_trait]
impl Fetcher for NetworkFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {e}", request.url)))?;

        let kind = self.classify(request);
        let final_url = response.url().clone();
        let redirected = final_url != request.url;

        if kind == ResponseKind::Opaque {
            tracing::debug!("fetched {} as opaque in {}ms", request.url, start.elapsed().as_millis());
            return Ok(Response { redirected, ..Response::opaque(final_url) });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} -> {} ({}) in {}ms ({} bytes)",
            request.url,
            final_url,
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url: final_url, status, kind, redirected, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::url::Url;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned HTTP/1.1 responses keyed by request path.
    async fn serve(routes: Vec<(&'static str, String)>) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let head = String::from_utf8_lossy(&buf[..n]).to_string();
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let reply = routes
                        .iter()
                        .find(|(p, _)| *p == path)
                        .map(|(_, r)| r.clone())
                        .unwrap_or_else(|| "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n".to_string());
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn ok(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.max_bytes, 20 * 1024 * 1024);
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 5);
    }

    #[tokio::test]
    async fn test_same_origin_is_basic() {
        let origin = serve(vec![("/index.html", ok("<html>shell</html>"))]).await;
        let fetcher = NetworkFetcher::new(FetchConfig::default(), origin.clone()).unwrap();

        let response = fetcher.fetch(&Request::get(origin.join("/index.html").unwrap())).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.kind, ResponseKind::Basic);
        assert!(!response.redirected);
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.body, "<html>shell</html>");
    }

    #[tokio::test]
    async fn test_http_error_is_response() {
        let origin = serve(Vec::new()).await;
        let fetcher = NetworkFetcher::new(FetchConfig::default(), origin.clone()).unwrap();

        let response = fetcher.fetch(&Request::get(origin.join("/nope").unwrap())).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_redirect_is_flagged() {
        let origin = serve(vec![
            ("/old.js", "HTTP/1.1 301 Moved\r\nlocation: /new.js\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".into()),
            ("/new.js", ok("bundle")),
        ])
        .await;
        let fetcher = NetworkFetcher::new(FetchConfig::default(), origin.clone()).unwrap();

        let response = fetcher.fetch(&Request::get(origin.join("/old.js").unwrap())).await.unwrap();
        assert!(response.redirected);
        assert_eq!(response.url.path(), "/new.js");
        assert!(!response.is_revalidation_eligible());
    }

    #[tokio::test]
    async fn test_cross_origin_no_cors_is_opaque() {
        let server = serve(vec![("/cat.png", ok("png"))]).await;
        let app = Url::parse("https://app.test/").unwrap();
        let fetcher = NetworkFetcher::new(FetchConfig::default(), app).unwrap();

        let request = Request::new(http_get(), server.join("/cat.png").unwrap(), RequestMode::NoCors);
        let response = fetcher.fetch(&request).await.unwrap();
        assert_eq!(response.kind, ResponseKind::Opaque);
        assert_eq!(response.status, 0);
        assert!(response.body.is_empty());

        let cors = Request::new(http_get(), server.join("/cat.png").unwrap(), RequestMode::Cors);
        assert_eq!(fetcher.fetch(&cors).await.unwrap().kind, ResponseKind::Cors);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let origin = serve(vec![("/big.js", ok("0123456789"))]).await;
        let config = FetchConfig { max_bytes: 4, ..Default::default() };
        let fetcher = NetworkFetcher::new(config, origin.clone()).unwrap();

        let result = fetcher.fetch(&Request::get(origin.join("/big.js").unwrap())).await;
        assert!(matches!(result, Err(Error::FetchTooLarge(_))));
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let origin = Url::parse(&format!("http://{addr}/")).unwrap();
        let fetcher = NetworkFetcher::new(FetchConfig::default(), origin.clone()).unwrap();

        let result = fetcher.fetch(&Request::get(origin)).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    fn http_get() -> reqwest::Method {
        reqwest::Method::GET
    }
}
