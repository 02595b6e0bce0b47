//! Counting fakes of the host traits, shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use precache::{
    CacheController, CacheStorage, CacheStore, MemoryCacheStorage, Network, PrecacheError,
    Request, RequestKey, Response, ResponseSnapshot, ResponseType, Result, WorkerHost,
};

pub const SCOPE: &str = "https://app.example/";

pub fn url(path: &str) -> String {
    format!("https://app.example{path}")
}

// ============================================================================
// Network
// ============================================================================

#[derive(Clone)]
struct Route {
    status: StatusCode,
    response_type: ResponseType,
    body: String,
    redirected: bool,
}

/// Network answering from a fixed route table; unknown URLs fail like a
/// dropped connection.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Route>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every fetch is counted, then waits until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Default::default()
        })
    }

    pub fn route(&self, url: &str, status: u16, body: &str) {
        self.route_typed(url, status, ResponseType::Basic, body);
    }

    pub fn route_typed(&self, url: &str, status: u16, response_type: ResponseType, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route {
                status: StatusCode::from_u16(status).unwrap(),
                response_type,
                body: body.to_string(),
                redirected: false,
            },
        );
    }

    pub fn route_redirected(&self, url: &str, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route {
                status: StatusCode::OK,
                response_type: ResponseType::Basic,
                body: body.to_string(),
                redirected: true,
            },
        );
    }

    pub fn unroute(&self, url: &str) {
        self.routes.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url().to_string();
        self.requested.lock().unwrap().push(url.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let route = self.routes.lock().unwrap().get(&url).cloned();
        match route {
            Some(route) => Ok(Response::new(route.status, route.body)
                .with_type(route.response_type)
                .with_url(request.url().clone())
                .with_redirected(route.redirected)),
            None => Err(PrecacheError::Network(format!("connection refused: {url}"))),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Wraps [`MemoryCacheStorage`], counting every storage and store call.
pub struct CountingStorage {
    inner: MemoryCacheStorage,
    calls: Arc<AtomicUsize>,
    puts: Arc<Mutex<Vec<RequestKey>>>,
    failing_deletes: Mutex<HashSet<String>>,
    failing_open: AtomicBool,
    failing_puts: Arc<AtomicBool>,
    put_gate: Option<Arc<Notify>>,
}

impl CountingStorage {
    pub fn new(network: Arc<dyn Network>) -> Arc<Self> {
        Arc::new(Self::build(network, None))
    }

    /// Every `put` waits until `gate` is notified.
    pub fn gated(network: Arc<dyn Network>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::build(network, Some(gate)))
    }

    fn build(network: Arc<dyn Network>, put_gate: Option<Arc<Notify>>) -> Self {
        Self {
            inner: MemoryCacheStorage::new(network),
            calls: Arc::new(AtomicUsize::new(0)),
            puts: Arc::new(Mutex::new(Vec::new())),
            failing_deletes: Mutex::new(HashSet::new()),
            failing_open: AtomicBool::new(false),
            failing_puts: Arc::new(AtomicBool::new(false)),
            put_gate,
        }
    }

    pub fn fail_delete(&self, name: &str) {
        self.failing_deletes.lock().unwrap().insert(name.to_string());
    }

    /// Every `open` fails from now on.
    pub fn fail_open(&self) {
        self.failing_open.store(true, Ordering::SeqCst);
    }

    /// Every store `put` fails from now on.
    pub fn fail_puts(&self) {
        self.failing_puts.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> Vec<RequestKey> {
        self.puts.lock().unwrap().clone()
    }

    /// Read an entry directly, bypassing the call counter.
    pub async fn peek(&self, cache: &str, url: &str) -> Option<ResponseSnapshot> {
        let store = self.inner.get(cache).await?;
        store
            .match_request(&Request::get(url).unwrap().key())
            .await
            .unwrap()
    }

    /// Seed a store directly, bypassing the call counter.
    pub async fn seed(&self, cache: &str, url: &str, body: &str) {
        let store = self.inner.open(cache).await.unwrap();
        store
            .put(Request::get(url).unwrap().key(), Response::ok(body.to_string()).into())
            .await
            .unwrap();
    }

    pub async fn entry_count(&self, cache: &str) -> usize {
        match self.inner.get(cache).await {
            Some(store) => store.len(),
            None => 0,
        }
    }

    pub async fn names(&self) -> Vec<String> {
        self.inner.keys().await.unwrap()
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_open.load(Ordering::SeqCst) {
            return Err(PrecacheError::Storage(format!("cannot open {name}")));
        }
        let inner = self.inner.open(name).await?;
        Ok(Arc::new(CountingStore {
            inner,
            calls: Arc::clone(&self.calls),
            puts: Arc::clone(&self.puts),
            failing_puts: Arc::clone(&self.failing_puts),
            put_gate: self.put_gate.clone(),
        }))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_deletes.lock().unwrap().contains(name) {
            return Err(PrecacheError::Storage(format!("quota error deleting {name}")));
        }
        self.inner.delete(name).await
    }
}

struct CountingStore {
    inner: Arc<dyn CacheStore>,
    calls: Arc<AtomicUsize>,
    puts: Arc<Mutex<Vec<RequestKey>>>,
    failing_puts: Arc<AtomicBool>,
    put_gate: Option<Arc<Notify>>,
}

#[async_trait]
impl CacheStore for CountingStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn match_request(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.match_request(key).await
    }

    async fn put(&self, key: RequestKey, snapshot: ResponseSnapshot) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.put_gate {
            gate.notified().await;
        }
        if self.failing_puts.load(Ordering::SeqCst) {
            return Err(PrecacheError::Storage("quota exceeded".to_string()));
        }
        self.puts.lock().unwrap().push(key.clone());
        self.inner.put(key, snapshot).await
    }

    async fn add_all(&self, requests: &[Request]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.add_all(requests).await
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.keys().await
    }
}

// ============================================================================
// Host
// ============================================================================

#[derive(Default)]
pub struct RecordingHost {
    pub skip_waiting_calls: AtomicUsize,
    pub claim_calls: AtomicUsize,
    pub fail_claim: bool,
    pub claim_gate: Option<Arc<Notify>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_claim() -> Arc<Self> {
        Arc::new(Self {
            fail_claim: true,
            ..Default::default()
        })
    }

    /// `claim_clients` is counted, then waits until `gate` is notified.
    pub fn gated_claim(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            claim_gate: Some(gate),
            ..Default::default()
        })
    }
}

#[async_trait]
impl WorkerHost for RecordingHost {
    async fn skip_waiting(&self) -> Result<()> {
        self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.claim_gate {
            gate.notified().await;
        }
        if self.fail_claim {
            return Err(PrecacheError::InvalidInput("no clients".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub network: Arc<FakeNetwork>,
    pub storage: Arc<CountingStorage>,
    pub host: Arc<RecordingHost>,
    pub controller: CacheController,
}

impl Fixture {
    pub fn new(version: &str, assets: &[&str]) -> Self {
        let network = FakeNetwork::new();
        let storage = CountingStorage::new(network.clone());
        Self::with_parts(version, assets, network, storage, RecordingHost::new())
    }

    pub fn with_parts(
        version: &str,
        assets: &[&str],
        network: Arc<FakeNetwork>,
        storage: Arc<CountingStorage>,
        host: Arc<RecordingHost>,
    ) -> Self {
        let controller = CacheController::builder()
            .version(version)
            .scope(SCOPE)
            .build_assets(assets.iter().copied())
            .storage(storage.clone())
            .network(network.clone())
            .host(host.clone())
            .build()
            .unwrap();
        Self {
            network,
            storage,
            host,
            controller,
        }
    }
}
