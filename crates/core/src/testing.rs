//! In-process collaborators for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use url::Url;

use crate::Error;
use crate::cache::{CacheDb, CacheStorage};
use crate::fetch::Fetcher;
use crate::request::Request;
use crate::response::Response;

pub const ORIGIN: &str = "https://app.test/";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

#[derive(Clone)]
enum Script {
    Respond(Response),
    Fail(String),
    TooLarge,
}

/// Fetcher answering from a script. Unscripted URLs fail like an offline
/// network.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &Url, response: Response) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), Script::Respond(response));
    }

    pub fn respond_ok(&self, url: &Url, body: &'static str) {
        self.respond(url, Response::basic(url.clone(), 200, body));
    }

    pub fn fail(&self, url: &Url) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), Script::Fail("connection refused".into()));
    }

    pub fn too_large(&self, url: &Url) {
        self.scripts.lock().unwrap().insert(url.to_string(), Script::TooLarge);
    }

    /// Hold every subsequent fetch until [`ScriptedFetcher::release`].
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.close();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.url.to_string());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            // Closing the semaphore is the release signal.
            let _ = gate.acquire().await;
        }

        let script = self.scripts.lock().unwrap().get(request.url.as_str()).cloned();
        match script {
            Some(Script::Respond(response)) => Ok(response),
            Some(Script::Fail(reason)) => Err(Error::Network(reason)),
            Some(Script::TooLarge) => Err(Error::FetchTooLarge(format!("{} exceeds limit", request.url))),
            None => Err(Error::Network(format!("offline: {}", request.url))),
        }
    }
}

/// SQLite storage with injectable write failures.
pub struct FlakyStorage {
    pub db: CacheDb,
    fail_puts: Mutex<bool>,
    fail_deletes: Mutex<HashSet<String>>,
}

impl FlakyStorage {
    pub async fn new() -> Arc<Self> {
        Arc::new(Self {
            db: CacheDb::open_in_memory().await.unwrap(),
            fail_puts: Mutex::new(false),
            fail_deletes: Mutex::new(HashSet::new()),
        })
    }

    pub fn fail_puts(&self) {
        *self.fail_puts.lock().unwrap() = true;
    }

    pub fn fail_delete(&self, namespace: &str) {
        self.fail_deletes.lock().unwrap().insert(namespace.to_string());
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        self.db.open_namespace(namespace).await
    }

    async fn seed(&self, namespace: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        self.db.seed_namespace(namespace, entries).await
    }

    async fn is_ready(&self, namespace: &str) -> Result<bool, Error> {
        self.db.is_namespace_ready(namespace).await
    }

    async fn lookup(&self, namespace: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.db.match_entry(namespace, request).await
    }

    async fn put(&self, namespace: &str, request: &Request, response: &Response) -> Result<(), Error> {
        if *self.fail_puts.lock().unwrap() {
            return Err(Error::CorruptEntry("disk full".into()));
        }
        self.db.put_entry(namespace, request, response).await
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        if self.fail_deletes.lock().unwrap().contains(namespace) {
            return Err(Error::CorruptEntry(format!("{namespace} is locked")));
        }
        self.db.delete_namespace(namespace).await
    }

    async fn namespaces(&self) -> Result<Vec<String>, Error> {
        self.db.namespace_names().await
    }
}
