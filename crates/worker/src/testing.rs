//! Fakes shared by the worker tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use offcache_client::Fetch;
use offcache_core::{AppConfig, CacheDb, CacheEntry, CacheStore, Error, Request, Response};

use crate::Worker;

pub const ORIGIN: &str = "http://localhost:8080";

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn site_config() -> AppConfig {
    AppConfig { origin: ORIGIN.into(), ..Default::default() }
}

pub fn ok(content_type: &str, body: &'static str) -> Response {
    Response::new(200, vec![("Content-Type".into(), content_type.into())], body)
}

/// In-process network keyed by absolute URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Response>>,
    unreachable: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: Mutex<Vec<Request>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default site: every default manifest entry answers 200.
    pub fn site() -> Self {
        Self::new()
            .route("/", ok("text/html", "<h1>home</h1>"))
            .route("/index.html", ok("text/html", "<h1>home</h1>"))
            .route("/app.js", ok("application/javascript", "console.log('app')"))
            .route("/app.css", ok("text/css", "body { margin: 0 }"))
            .route("/offline.html", ok("text/html", "<h1>offline</h1>"))
            .route("/images/animated.gif", ok("image/gif", "GIF89a"))
    }

    pub fn route(self, path: &str, response: Response) -> Self {
        self.routes.lock().unwrap().insert(url(path), response);
        self
    }

    /// Fetches to `path` reject as if the connection dropped.
    pub fn unreachable(self, path: &str) -> Self {
        self.unreachable.lock().unwrap().insert(url(path));
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetch for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.clone());

        if self.offline.load(Ordering::SeqCst) || self.unreachable.lock().unwrap().contains(&request.url) {
            return Err(Error::Network(format!("{}: connection refused", request.url)));
        }

        let response = self.routes.lock().unwrap().get(&request.url).cloned();
        Ok(response.unwrap_or_else(|| Response::new(404, vec![], "not found")))
    }
}

fn unavailable() -> Error {
    Error::Database(tokio_rusqlite::Error::ConnectionClosed)
}

/// A store whose every operation fails.
pub struct BrokenStore;

#[async_trait]
impl CacheStore for BrokenStore {
    async fn open(&self, _bucket: &str) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn put_all(&self, _bucket: &str, _entries: Vec<CacheEntry>) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn match_request(&self, _request: &Request) -> Result<Option<Response>, Error> {
        Err(unavailable())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Err(unavailable())
    }

    async fn delete(&self, _bucket: &str) -> Result<bool, Error> {
        Err(unavailable())
    }

    async fn entries(&self, _bucket: &str) -> Result<Vec<String>, Error> {
        Err(unavailable())
    }
}

/// Wraps a real store but refuses to delete the named buckets.
pub struct StickyStore {
    pub inner: CacheDb,
    pub sticky: HashSet<String>,
}

#[async_trait]
impl CacheStore for StickyStore {
    async fn open(&self, bucket: &str) -> Result<(), Error> {
        self.inner.open(bucket).await
    }

    async fn put_all(&self, bucket: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        self.inner.put_all(bucket, entries).await
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_request(request).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, bucket: &str) -> Result<bool, Error> {
        if self.sticky.contains(bucket) {
            return Err(unavailable());
        }
        self.inner.delete(bucket).await
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<String>, Error> {
        self.inner.entries(bucket).await
    }
}

pub async fn worker(network: Arc<FakeNetwork>) -> (Worker, CacheDb) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let worker = Worker::new(&site_config(), Arc::new(db.clone()), network).unwrap();
    (worker, db)
}
