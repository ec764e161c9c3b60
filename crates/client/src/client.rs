//! HTTP client with response caching and request coalescing
//!
//! GET requests go through a [`RequestCoalescer`]: identical concurrent GETs
//! share one fetch and successful responses are cached for the configured
//! time-to-live. Other verbs always reach the fetcher.
//!
//! Responses the [`StatusInspector`] flags, and bodies that fail to decode,
//! are reported on a broadcast side channel of [`StatusEvent`]s while the
//! caller still receives its result. Cancellation is never reported there.

use crate::cancel::CancelToken;
use crate::coalesce::{Outcome, RequestCoalescer};
use crate::config::ClientConfig;
use crate::errors::{FetchError, Result};
use crate::fetch::{DefaultStatusInspector, Fetcher, RequestPreprocessor, StatusInspector};
use crate::fingerprint::Fingerprint;
use crate::request::{ContentType, Method, QueryParams, RequestContext, ToQuery};
use crate::response::Response;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Requests slower than this are logged at `info`.
const SLOW_REQUEST: Duration = Duration::from_millis(300);

/// Requests slower than this are logged at `warn`.
const VERY_SLOW_REQUEST: Duration = Duration::from_millis(1000);

/// Bodies at least this long are never attached to logs.
const MAX_LOGGED_BODY: usize = 10_000;

/// Why a status event was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReason {
    /// The status inspector flagged the response
    Inspector,
    /// The response body could not be decoded
    DecodeFailure,
}

/// Side-channel notification for the host, for example to re-authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: u16,
    pub path: String,
    pub reason: StatusReason,
}

struct ClientInner<F: Fetcher> {
    config: ClientConfig,
    fetcher: F,
    preprocessors: Vec<Arc<dyn RequestPreprocessor>>,
    inspector: Arc<dyn StatusInspector>,
    coalescer: RequestCoalescer<Response>,
    status_events: broadcast::Sender<StatusEvent>,
}

/// Host-facing HTTP client. Cloning is cheap and shares all state.
pub struct HttpClient<F: Fetcher> {
    inner: Arc<ClientInner<F>>,
}

impl<F: Fetcher> Clone for HttpClient<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for [`HttpClient`]
pub struct HttpClientBuilder<F: Fetcher> {
    config: ClientConfig,
    fetcher: F,
    preprocessors: Vec<Arc<dyn RequestPreprocessor>>,
    inspector: Arc<dyn StatusInspector>,
}

impl<F: Fetcher> HttpClientBuilder<F> {
    /// Add a preprocessor; preprocessors run in insertion order.
    pub fn preprocessor(mut self, preprocessor: impl RequestPreprocessor + 'static) -> Self {
        self.preprocessors.push(Arc::new(preprocessor));
        self
    }

    pub fn inspector(mut self, inspector: impl StatusInspector + 'static) -> Self {
        self.inspector = Arc::new(inspector);
        self
    }

    pub fn build(self) -> Result<HttpClient<F>> {
        self.config.validate()?;

        let inspector = Arc::clone(&self.inspector);
        let coalescer =
            RequestCoalescer::<Response>::with_cache_predicate(&self.config.cache, move |response| {
                inspector.is_cacheable(response)
            })?;
        let (status_events, _) = broadcast::channel(self.config.status_channel_capacity);

        debug!(
            base_path = %self.config.base_path,
            cache_capacity = self.config.cache.capacity,
            "creating http client"
        );

        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                fetcher: self.fetcher,
                preprocessors: self.preprocessors,
                inspector: self.inspector,
                coalescer,
                status_events,
            }),
        })
    }
}

impl<F: Fetcher> HttpClient<F> {
    pub fn builder(config: ClientConfig, fetcher: F) -> HttpClientBuilder<F> {
        HttpClientBuilder {
            config,
            fetcher,
            preprocessors: Vec::new(),
            inspector: Arc::new(DefaultStatusInspector),
        }
    }

    /// Client with no preprocessors and the default status inspector.
    pub fn new(config: ClientConfig, fetcher: F) -> Result<Self> {
        Self::builder(config, fetcher).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Subscribe to status events raised from now on.
    pub fn status_events(&self) -> broadcast::Receiver<StatusEvent> {
        self.inner.status_events.subscribe()
    }

    pub fn coalescer(&self) -> &RequestCoalescer<Response> {
        &self.inner.coalescer
    }

    /// Build a request against the configured base path.
    pub fn request(&self, method: Method, path: &str, query: &impl ToQuery) -> RequestContext {
        RequestContext::with_query(method, &self.inner.config.base_path, path, query.to_query())
    }

    /// Cached, coalesced GET.
    pub async fn get(&self, path: &str, cancel: &CancelToken) -> Outcome<Response> {
        self.get_with_query(path, &QueryParams::new(), cancel).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &impl ToQuery,
        cancel: &CancelToken,
    ) -> Outcome<Response> {
        let request = self.request(Method::Get, path, query);
        self.send(request, true, cancel).await
    }

    /// GET that neither reads nor populates the cache and is never coalesced.
    pub async fn get_without_cache(&self, path: &str, cancel: &CancelToken) -> Outcome<Response> {
        let request = self.request(Method::Get, path, &());
        self.send(request, false, cancel).await
    }

    /// Cached GET decoded as JSON.
    ///
    /// A body that fails to decode yields `Value(None)`, is evicted from the
    /// cache unless a newer response replaced it meanwhile, and raises a
    /// [`StatusReason::DecodeFailure`] event.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Outcome<Option<T>> {
        let request = self.request(Method::Get, path, &());
        let fingerprint = request.fingerprint();
        let final_path = request.final_path().to_owned();
        let outcome = self.send(request, true, cancel).await;
        self.decode(outcome, &final_path, Some(fingerprint))
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        cancel: &CancelToken,
    ) -> Outcome<Response> {
        let request = self.request(Method::Post, path, &()).body(body, ContentType::Json);
        self.send(request, false, cancel).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        cancel: &CancelToken,
    ) -> Outcome<Option<T>> {
        let request = self.request(Method::Post, path, &()).body(body, ContentType::Json);
        let final_path = request.final_path().to_owned();
        let outcome = self.send(request, false, cancel).await;
        self.decode(outcome, &final_path, None)
    }

    pub async fn put(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        cancel: &CancelToken,
    ) -> Outcome<Response> {
        let request = self.request(Method::Put, path, &()).body(body, ContentType::Json);
        self.send(request, false, cancel).await
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        cancel: &CancelToken,
    ) -> Outcome<Option<T>> {
        let request = self.request(Method::Put, path, &()).body(body, ContentType::Json);
        let final_path = request.final_path().to_owned();
        let outcome = self.send(request, false, cancel).await;
        self.decode(outcome, &final_path, None)
    }

    pub async fn delete(&self, path: &str, cancel: &CancelToken) -> Outcome<Response> {
        let request = self.request(Method::Delete, path, &());
        self.send(request, false, cancel).await
    }

    /// Send an arbitrary request.
    ///
    /// With `use_cache` a GET is answered from the cache or joined with an
    /// identical request in flight. Other verbs always reach the fetcher and
    /// are never stored, whatever `use_cache` says.
    ///
    /// Callers joining another caller's request share its outcome, including
    /// cancellation by the initiator; cancelling `cancel` only abandons this
    /// caller's wait.
    pub async fn send(
        &self,
        request: RequestContext,
        use_cache: bool,
        cancel: &CancelToken,
    ) -> Outcome<Response> {
        let use_cache = use_cache && request.method() == Method::Get;
        let fingerprint = request.fingerprint();
        let final_path = request.final_path().to_owned();
        let inner = Arc::clone(&self.inner);
        let token = cancel.clone();

        let coalesced = self
            .inner
            .coalescer
            .get(fingerprint, use_cache, move || async move {
                inner.execute(request, token).await
            });

        let outcome = tokio::select! {
            biased;
            outcome = coalesced => outcome,
            _ = cancel.cancelled() => Outcome::Cancelled,
        };

        if let Outcome::Value(response) = &outcome {
            if self.inner.inspector.requires_attention(response) {
                self.inner
                    .raise(response.status, final_path, StatusReason::Inspector);
            }
        }

        outcome
    }

    /// Drop the cached response for `request`.
    pub fn invalidate(&self, request: &RequestContext) -> bool {
        self.inner.coalescer.invalidate(request.fingerprint())
    }

    pub fn hit_ratio(&self) -> f64 {
        self.inner.coalescer.hit_ratio()
    }

    fn decode<T: DeserializeOwned>(
        &self,
        outcome: Outcome<Response>,
        path: &str,
        fingerprint: Option<Fingerprint>,
    ) -> Outcome<Option<T>> {
        match outcome {
            Outcome::Value(response) => match response.json::<T>() {
                Ok(value) => Outcome::Value(value),
                Err(err) => {
                    warn!(
                        path,
                        status = response.status,
                        error = %err,
                        "failed to decode response"
                    );
                    if let Some(fingerprint) = fingerprint {
                        self.inner
                            .coalescer
                            .invalidate_if(fingerprint, |cached| *cached == response);
                    }
                    self.inner
                        .raise(response.status, path.to_owned(), StatusReason::DecodeFailure);
                    Outcome::Value(None)
                }
            },
            Outcome::Cancelled => Outcome::Cancelled,
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }
}

impl<F: Fetcher> ClientInner<F> {
    async fn execute(
        &self,
        mut request: RequestContext,
        cancel: CancelToken,
    ) -> Outcome<Response> {
        if cancel.is_cancelled() {
            debug!(method = %request.method(), path = request.final_path(), "cancelled before sending");
            return Outcome::Cancelled;
        }

        request.set_timeout(self.config.timeout);
        for preprocessor in &self.preprocessors {
            preprocessor.preprocess(&mut request);
        }
        debug!(method = %request.method(), path = request.final_path(), "starting request");

        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetcher.fetch(&request) => result,
        };
        let elapsed = started.elapsed();

        if cancel.is_cancelled() {
            debug!(method = %request.method(), path = request.final_path(), "request cancelled");
            return Outcome::Cancelled;
        }

        match result {
            Ok(response) => {
                self.log_completion(&request, &response, elapsed);
                Outcome::Value(response)
            }
            Err(FetchError::Cancelled) => {
                debug!(method = %request.method(), path = request.final_path(), "request cancelled by transport");
                Outcome::Cancelled
            }
            Err(err) => {
                error!(
                    method = %request.method(),
                    path = request.final_path(),
                    error = %err,
                    "request failed"
                );
                Outcome::Failed(Arc::new(err))
            }
        }
    }

    fn log_completion(&self, request: &RequestContext, response: &Response, elapsed: Duration) {
        let body = if self.config.log_bodies && response.body.len() < MAX_LOGGED_BODY {
            response.text().into_owned()
        } else {
            String::new()
        };
        let elapsed_ms = elapsed.as_millis() as u64;
        let method = request.method();
        let path = request.final_path();

        if elapsed > VERY_SLOW_REQUEST {
            warn!(%method, path, status = response.status, elapsed_ms, body, "slow request completed");
        } else if elapsed > SLOW_REQUEST {
            info!(%method, path, status = response.status, elapsed_ms, body, "slow request completed");
        } else {
            debug!(%method, path, status = response.status, elapsed_ms, body, "request completed");
        }
    }

    fn raise(&self, status: u16, path: String, reason: StatusReason) {
        let event = StatusEvent {
            status,
            path,
            reason,
        };
        debug!(?event, "raising status event");
        // No subscribers is not an error
        let _ = self.status_events.send(event);
    }
}

impl<F: Fetcher> fmt::Debug for HttpClient<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .field("preprocessors", &self.inner.preprocessors.len())
            .field("coalescer", &self.inner.coalescer)
            .finish_non_exhaustive()
    }
}
