//! The network capability the engine depends on.

use async_trait::async_trait;

use crate::Error;
use crate::request::Request;
use crate::response::Response;

/// Live network access.
///
/// HTTP error statuses are responses, not errors: only a failure to obtain
/// any response (DNS, connection, TLS, body read) is an `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
