//! Common test utilities for client integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use netcache_client::{ClientConfig, FetchError, Fetcher, HttpClient, RequestContext, Response};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const BASE: &str = "https://api.test";

#[derive(Default)]
struct MockState {
    calls: AtomicUsize,
    delay: Mutex<Duration>,
    scripted: Mutex<HashMap<String, std::result::Result<Response, FetchError>>>,
    seen: Mutex<Vec<RequestContext>>,
}

/// Fetcher that answers from a script and records every request it sees.
///
/// Unscripted paths answer `200` with `{"ok":true}`.
#[derive(Clone, Default)]
pub struct MockFetcher {
    state: Arc<MockState>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for a mock that sleeps before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock() = delay;
        self
    }

    /// Answer requests whose final path is `BASE/path` with `response`.
    pub fn respond(&self, path: &str, response: Response) {
        self.state
            .scripted
            .lock()
            .insert(format!("{BASE}/{path}"), Ok(response));
    }

    pub fn fail(&self, path: &str, error: FetchError) {
        self.state
            .scripted
            .lock()
            .insert(format!("{BASE}/{path}"), Err(error));
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Headers of every request seen so far, in arrival order.
    pub fn seen_headers(&self) -> Vec<BTreeMap<String, String>> {
        self.state
            .seen
            .lock()
            .iter()
            .map(|request| request.headers().clone())
            .collect()
    }

    pub fn seen_paths(&self) -> Vec<String> {
        self.state
            .seen
            .lock()
            .iter()
            .map(|request| request.final_path().to_owned())
            .collect()
    }

    pub fn seen_timeouts(&self) -> Vec<Option<Duration>> {
        self.state.seen.lock().iter().map(RequestContext::timeout).collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &RequestContext) -> Result<Response, FetchError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.seen.lock().push(request.clone());

        let delay = *self.state.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.state.scripted.lock().get(request.final_path()).cloned();
        scripted.unwrap_or_else(|| Ok(Response::new(200, r#"{"ok":true}"#)))
    }
}

/// Install the compact stderr subscriber once per test binary.
pub fn init_tracing() {
    // Later calls find the subscriber already installed
    let _ = netcache_utils::tracing::init_with_filter(Some("netcache_client=debug"));
}

pub fn config() -> ClientConfig {
    ClientConfig::builder(BASE)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub fn client(fetcher: &MockFetcher) -> HttpClient<MockFetcher> {
    init_tracing();
    HttpClient::new(config(), fetcher.clone()).unwrap()
}
