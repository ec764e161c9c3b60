//! Reference-counted lifetimes for values with cleanup
//!
//! A [`ScopedCache`] stores each value inside a [`Scoped`] wrapper. The cache
//! itself holds one reference; every [`Lifetime`] handed to a caller holds
//! another. Evicting, removing or replacing the entry drops the cache's
//! reference, and the value's cleanup runs only when the last lifetime is
//! released, so callers never observe a value that has already been cleaned
//! up while they still hold it.

use crate::core::SegmentedCache;
use crate::dispose::{Disposer, NoopDisposer};
use crate::errors::Result;
use crate::eviction::{ItemPolicy, LruPolicy};
use crate::telemetry::{NoTelemetry, TelemetryPolicy};
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Cleanup<T> = Arc<dyn Disposer<T>>;

#[derive(Debug)]
struct CountState {
    count: usize,
    disposed: bool,
}

/// A value paired with the number of live holders.
pub struct ReferenceCount<T> {
    value: T,
    state: Mutex<CountState>,
    cleanup: Cleanup<T>,
}

impl<T> ReferenceCount<T> {
    fn new(value: T, cleanup: Cleanup<T>) -> Self {
        Self {
            value,
            state: Mutex::new(CountState {
                count: 1,
                disposed: false,
            }),
            cleanup,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn count(&self) -> usize {
        self.state.lock().count
    }

    fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if state.disposed || state.count == 0 {
            return false;
        }
        state.count += 1;
        true
    }

    fn release(&self) {
        let last = {
            let mut state = self.state.lock();
            state.count = state.count.saturating_sub(1);
            state.count == 0
        };

        if last {
            self.cleanup.dispose(&self.value);
        }
    }

    /// Drop the owner's reference, at most once.
    fn dispose(&self) {
        let last = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.count = state.count.saturating_sub(1);
            state.count == 0
        };

        if last {
            self.cleanup.dispose(&self.value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReferenceCount<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCount")
            .field("value", &self.value)
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Wrapper stored by the cache for a value with a cleanup.
pub struct Scoped<T> {
    inner: Arc<ReferenceCount<T>>,
}

impl<T> Scoped<T> {
    pub fn new(value: T) -> Self {
        Self::with_cleanup(value, Arc::new(NoopDisposer))
    }

    /// Wrap `value`, running `cleanup` once the last holder releases it.
    pub fn with_cleanup(value: T, cleanup: Arc<dyn Disposer<T>>) -> Self {
        Self {
            inner: Arc::new(ReferenceCount::new(value, cleanup)),
        }
    }

    /// Take a new reference, or `None` once the scope has been disposed.
    pub fn create_lifetime(&self) -> Option<Lifetime<T>> {
        if self.inner.try_acquire() {
            Some(Lifetime {
                inner: Arc::clone(&self.inner),
                released: AtomicBool::new(false),
            })
        } else {
            None
        }
    }

    /// Drop the owner's reference. Repeated calls are no-ops.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }
}

impl<T> Clone for Scoped<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scoped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scoped").field(&self.inner).finish()
    }
}

/// A caller's reference to a scoped value. Dropping it releases the reference.
pub struct Lifetime<T> {
    inner: Arc<ReferenceCount<T>>,
    released: AtomicBool,
}

impl<T> Lifetime<T> {
    /// The value. It stays readable after release, but its cleanup may have run.
    pub fn value(&self) -> &T {
        &self.inner.value
    }

    /// Live holders of the value, the cache included while it still owns it.
    pub fn reference_count(&self) -> usize {
        self.inner.count()
    }

    pub fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.inner.release();
        }
    }
}

impl<T> Drop for Lifetime<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: fmt::Debug> fmt::Debug for Lifetime<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifetime")
            .field("value", self.value())
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish()
    }
}

/// Disposes scopes leaving the cache by dropping the cache's reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedDisposer;

impl<T> Disposer<Scoped<T>> for ScopedDisposer {
    fn dispose(&self, value: &Scoped<T>) {
        value.dispose();
    }
}

/// Segmented cache whose values are handed out as [`Lifetime`]s.
pub struct ScopedCache<K, T, P = LruPolicy, Tel = NoTelemetry>
where
    P: ItemPolicy<K, Scoped<T>>,
{
    cache: SegmentedCache<K, Scoped<T>, P, Tel>,
    cleanup: Cleanup<T>,
}

impl<K, T, P, Tel> ScopedCache<K, T, P, Tel>
where
    K: Eq + Hash + Clone,
    T: Send + Sync + 'static,
    P: ItemPolicy<K, Scoped<T>>,
    Tel: TelemetryPolicy<K, Scoped<T>>,
{
    pub fn new(capacity: usize, policy: P, telemetry: Tel) -> Result<Self> {
        Self::with_cleanup(capacity, policy, telemetry, NoopDisposer)
    }

    /// Create a cache that runs `cleanup` on each value once no holder remains.
    pub fn with_cleanup<D>(capacity: usize, policy: P, telemetry: Tel, cleanup: D) -> Result<Self>
    where
        D: Disposer<T> + 'static,
    {
        Ok(Self {
            cache: SegmentedCache::with_disposer(capacity, policy, telemetry, ScopedDisposer)?,
            cleanup: Arc::new(cleanup),
        })
    }

    /// Acquire a lifetime for a cached value.
    pub fn acquire(&self, key: &K) -> Option<Lifetime<T>> {
        self.cache
            .try_get(key)
            .and_then(|scope| scope.create_lifetime())
    }

    /// Acquire a lifetime, creating the value with `factory` on a miss.
    pub fn get_or_acquire<F>(&self, key: K, mut factory: F) -> Lifetime<T>
    where
        F: FnMut(&K) -> T,
    {
        loop {
            let scope = self.cache.get_or_add(key.clone(), |key| {
                Scoped::with_cleanup(factory(key), Arc::clone(&self.cleanup))
            });

            // The scope can be disposed between lookup and acquisition if it
            // was evicted; by then it is gone from the map and a retry
            // creates a fresh one.
            if let Some(lifetime) = scope.create_lifetime() {
                return lifetime;
            }
        }
    }

    pub fn add_or_update(&self, key: K, value: T) {
        self.cache
            .add_or_update(key, Scoped::with_cleanup(value, Arc::clone(&self.cleanup)));
    }

    pub fn try_remove(&self, key: &K) -> bool {
        self.cache.try_remove(key)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// The underlying store.
    pub fn cache(&self) -> &SegmentedCache<K, Scoped<T>, P, Tel> {
        &self.cache
    }
}

impl<K, T, P, Tel> fmt::Debug for ScopedCache<K, T, P, Tel>
where
    P: ItemPolicy<K, Scoped<T>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCache")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispose::DisposeFn;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn counting_cache(capacity: usize) -> (ScopedCache<u32, String>, Arc<AtomicUsize>) {
        let cleaned = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cleaned);
        let cache = ScopedCache::with_cleanup(
            capacity,
            LruPolicy,
            NoTelemetry,
            DisposeFn(move |_: &String| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        (cache, cleaned)
    }

    #[test]
    fn test_lifetime_outlives_removal() {
        let (cache, cleaned) = counting_cache(3);
        let lifetime = cache.get_or_acquire(1, |key| format!("value-{key}"));
        assert_eq!(lifetime.value(), "value-1");
        assert_eq!(lifetime.reference_count(), 2);

        assert!(cache.try_remove(&1));
        assert_eq!(cleaned.load(Ordering::SeqCst), 0);
        assert_eq!(lifetime.reference_count(), 1);
        assert!(cache.acquire(&1).is_none());

        drop(lifetime);
        assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_release_is_noop() {
        let (cache, cleaned) = counting_cache(3);
        cache.add_or_update(1, "v".to_string());

        let first = cache.acquire(&1).unwrap();
        let second = cache.acquire(&1).unwrap();
        assert_eq!(first.reference_count(), 3);

        first.release();
        first.release();
        assert_eq!(second.reference_count(), 2);

        drop(first);
        drop(second);
        cache.clear();
        assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disposed_scope_refuses_lifetimes() {
        let cleaned = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cleaned);
        let cleanup: Arc<dyn Disposer<u32>> = Arc::new(DisposeFn(move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let scope = Scoped::with_cleanup(5, cleanup);
        scope.dispose();
        scope.dispose();

        assert!(scope.is_disposed());
        assert!(scope.create_lifetime().is_none());
        assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replaced_value_is_cleaned_after_release() {
        let (cache, cleaned) = counting_cache(3);
        cache.add_or_update(1, "old".to_string());
        let held = cache.acquire(&1).unwrap();

        cache.add_or_update(1, "new".to_string());
        assert_eq!(cleaned.load(Ordering::SeqCst), 0);
        assert_eq!(held.value(), "old");
        assert_eq!(cache.acquire(&1).unwrap().value(), "new");

        drop(held);
        assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_acquire_and_remove_cleans_once() {
        let (cache, cleaned) = counting_cache(9);
        let cache = Arc::new(cache);
        let rounds = 200;

        for round in 0..rounds {
            cache.add_or_update(0, format!("round-{round}"));
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        if let Some(lifetime) = cache.acquire(&0) {
                            assert!(lifetime.value().starts_with("round-"));
                        }
                    })
                })
                .collect();
            cache.try_remove(&0);
            for handle in handles {
                handle.join().unwrap();
            }
        }

        assert_eq!(cleaned.load(Ordering::SeqCst), rounds);
    }
}
