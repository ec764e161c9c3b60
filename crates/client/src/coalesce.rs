//! Request coalescing
//!
//! A [`RequestCoalescer`] answers a fingerprint from its response cache when
//! it can. On a miss it either joins the computation already in flight for
//! that fingerprint or starts one, so any number of concurrent callers cause
//! a single fetch and all observe its outcome.
//!
//! The in-flight registry holds only a weak handle to each shared
//! computation. The computation carries a guard that removes its registry
//! entry when it finishes, and also when every waiter has gone away and the
//! computation is dropped unfinished. A successful, cacheable value is
//! published to the cache before the registry entry is removed, so a caller
//! arriving in between finds it in one place or the other.

use crate::errors::FetchError;
use crate::fingerprint::Fingerprint;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use netcache_cache::{CacheConfig, ConcurrentTLru, ItemRemovedEvent};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Result of a coalesced request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    Value(V),
    /// The fetch was cancelled. Never cached.
    Cancelled,
    /// The fetch failed. Never cached.
    Failed(Arc<FetchError>),
}

impl<V> Outcome<V> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn value(self) -> Option<V> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Outcome<U> {
        match self {
            Self::Value(value) => Outcome::Value(f(value)),
            Self::Cancelled => Outcome::Cancelled,
            Self::Failed(err) => Outcome::Failed(err),
        }
    }

    /// Convert into a `Result`, turning cancellation into
    /// [`ClientError::Cancelled`](crate::ClientError::Cancelled).
    pub fn into_result(self) -> crate::Result<V> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Cancelled => Err(crate::ClientError::Cancelled),
            Self::Failed(err) => Err(crate::ClientError::Fetch(err)),
        }
    }
}

type SharedOutcome<V> = Shared<BoxFuture<'static, Outcome<V>>>;

struct InFlight<V> {
    id: u64,
    computation: WeakShared<BoxFuture<'static, Outcome<V>>>,
}

type Registry<V> = DashMap<Fingerprint, Arc<InFlight<V>>>;

/// Removes a registry entry when its computation ends or is abandoned.
struct RegistryGuard<V: Clone + Send + Sync + 'static> {
    registry: Arc<Registry<V>>,
    fingerprint: Fingerprint,
    id: u64,
}

impl<V: Clone + Send + Sync + 'static> Drop for RegistryGuard<V> {
    fn drop(&mut self) {
        self.registry
            .remove_if(&self.fingerprint, |_, entry| entry.id == self.id);
    }
}

type CachePredicate<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

struct CoalescerInner<V: Clone + Send + Sync + 'static> {
    cache: ConcurrentTLru<Fingerprint, V>,
    registry: Arc<Registry<V>>,
    is_cacheable: CachePredicate<V>,
    next_id: AtomicU64,
}

/// Single-flight front for a time-aware response cache.
///
/// Cloning yields another handle to the same cache and registry.
pub struct RequestCoalescer<V: Clone + Send + Sync + 'static> {
    inner: Arc<CoalescerInner<V>>,
}

impl<V: Clone + Send + Sync + 'static> Clone for RequestCoalescer<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> RequestCoalescer<V> {
    /// Create a coalescer that caches every successful value.
    pub fn new(config: &CacheConfig) -> netcache_cache::Result<Self> {
        Self::with_cache_predicate(config, |_| true)
    }

    /// Create a coalescer that caches only values accepted by `is_cacheable`.
    pub fn with_cache_predicate<P>(config: &CacheConfig, is_cacheable: P) -> netcache_cache::Result<Self>
    where
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        Ok(Self {
            inner: Arc::new(CoalescerInner {
                cache: config.build_tlru()?,
                registry: Arc::new(DashMap::new()),
                is_cacheable: Arc::new(is_cacheable),
                next_id: AtomicU64::new(0),
            }),
        })
    }

    /// Resolve `fingerprint`, running `fetch` only if neither the cache nor
    /// an in-flight computation can answer.
    ///
    /// With `use_cache` false the cache and the registry are both bypassed
    /// and `fetch` always runs. The cache is not consulted first either: a
    /// caller asking for an uncached answer never receives a stored one, and
    /// the fresh value is not stored.
    pub async fn get<F, Fut>(&self, fingerprint: Fingerprint, use_cache: bool, fetch: F) -> Outcome<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome<V>> + Send + 'static,
    {
        if !use_cache {
            return fetch().await;
        }

        if let Some(value) = self.inner.cache.try_get(&fingerprint) {
            return Outcome::Value(value);
        }

        let computation = match self.inner.registry.entry(fingerprint) {
            Entry::Occupied(mut entry) => match entry.get().computation.upgrade() {
                Some(computation) => {
                    tracing::info!(%fingerprint, "request already in flight, awaiting it");
                    computation
                }
                // Every waiter left before the computation finished
                None => {
                    let (in_flight, computation) = self.start(fingerprint, fetch);
                    match in_flight {
                        Some(in_flight) => {
                            entry.insert(in_flight);
                        }
                        None => {
                            entry.remove();
                        }
                    }
                    computation
                }
            },
            Entry::Vacant(slot) => {
                // A computation that just finished publishes before leaving
                // the registry, so the cache may hold the value by now.
                if let Some(value) = self.inner.cache.try_get(&fingerprint) {
                    return Outcome::Value(value);
                }
                let (in_flight, computation) = self.start(fingerprint, fetch);
                if let Some(in_flight) = in_flight {
                    slot.insert(in_flight);
                }
                computation
            }
        };

        computation.await
    }

    fn start<F, Fut>(
        &self,
        fingerprint: Fingerprint,
        fetch: F,
    ) -> (Option<Arc<InFlight<V>>>, SharedOutcome<V>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome<V>> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = RegistryGuard {
            registry: Arc::clone(&self.inner.registry),
            fingerprint,
            id,
        };
        let inner = Arc::clone(&self.inner);

        let computation = async move {
            let outcome = fetch().await;
            if let Outcome::Value(value) = &outcome {
                if (inner.is_cacheable)(value) {
                    inner.cache.add_or_update(fingerprint, value.clone());
                }
            }
            drop(guard);
            outcome
        }
        .boxed()
        .shared();

        // Only a completed computation lacks a weak handle, and this one has
        // not been polled yet
        let in_flight = computation
            .downgrade()
            .map(|weak| Arc::new(InFlight { id, computation: weak }));

        (in_flight, computation)
    }

    /// Drop the cached value for `fingerprint`, if any.
    pub fn invalidate(&self, fingerprint: Fingerprint) -> bool {
        self.inner.cache.try_remove(&fingerprint)
    }

    /// Drop the cached value for `fingerprint` only if it satisfies
    /// `predicate`, leaving a newer value published in the meantime alone.
    pub fn invalidate_if<F>(&self, fingerprint: Fingerprint, predicate: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        self.inner.cache.try_remove_if(&fingerprint, predicate)
    }

    /// Store `value` for `fingerprint`, replacing any cached value.
    pub fn put(&self, fingerprint: Fingerprint, value: V) {
        self.inner.cache.add_or_update(fingerprint, value);
    }

    /// Cached value for `fingerprint` without joining or starting a fetch.
    pub fn cached(&self, fingerprint: Fingerprint) -> Option<V> {
        self.inner.cache.try_get(&fingerprint)
    }

    /// Number of computations currently registered as in flight.
    pub fn in_flight_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn hit_ratio(&self) -> f64 {
        self.inner.cache.hit_ratio()
    }

    /// Register a listener for cache removals and evictions.
    pub fn on_item_removed<L>(&self, listener: L)
    where
        L: Fn(&ItemRemovedEvent<'_, Fingerprint, V>) + Send + Sync + 'static,
    {
        self.inner.cache.on_item_removed(listener);
    }

    /// The underlying response cache.
    pub fn cache(&self) -> &ConcurrentTLru<Fingerprint, V> {
        &self.inner.cache
    }
}

impl<V: Clone + Send + Sync + 'static> fmt::Debug for RequestCoalescer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCoalescer")
            .field("cache", &self.inner.cache)
            .field("in_flight", &self.inner.registry.len())
            .finish()
    }
}
