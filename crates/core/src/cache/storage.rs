//! The storage capability the engine depends on.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::Error;
use crate::request::Request;
use crate::response::Response;

/// Durable key/value storage namespaced by generation identifier.
///
/// Implementations provide per-key atomicity only; there are no
/// transactions across keys except [`CacheStorage::seed`].
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the namespace, creating it if absent.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    /// Store every entry and mark the namespace ready, atomically.
    async fn seed(&self, namespace: &str, entries: &[(Request, Response)]) -> Result<(), Error>;

    async fn is_ready(&self, namespace: &str) -> Result<bool, Error>;

    async fn lookup(&self, namespace: &str, request: &Request) -> Result<Option<Response>, Error>;

    async fn put(&self, namespace: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Delete the namespace with all of its entries.
    async fn delete(&self, namespace: &str) -> Result<bool, Error>;

    async fn namespaces(&self) -> Result<Vec<String>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        self.open_namespace(namespace).await
    }

    async fn seed(&self, namespace: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        self.seed_namespace(namespace, entries).await
    }

    async fn is_ready(&self, namespace: &str) -> Result<bool, Error> {
        self.is_namespace_ready(namespace).await
    }

    async fn lookup(&self, namespace: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.match_entry(namespace, request).await
    }

    async fn put(&self, namespace: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_entry(namespace, request, response).await
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        self.delete_namespace(namespace).await
    }

    async fn namespaces(&self) -> Result<Vec<String>, Error> {
        self.namespace_names().await
    }
}
