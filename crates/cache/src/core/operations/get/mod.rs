//! Cache lookup operations

use crate::eviction::ItemPolicy;
use crate::telemetry::TelemetryPolicy;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use super::super::types::{Entry, SegmentedCache};

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    /// Look up `key`, marking the entry accessed on a hit.
    ///
    /// An entry the policy considers stale (expired under a time-to-live) is
    /// evicted and reported as a miss.
    pub fn try_get(&self, key: &K) -> Option<V> {
        match self.inner.map.get(key).map(|entry| Arc::clone(entry.value())) {
            Some(item) => self.get_or_discard(&item),
            None => {
                self.inner.telemetry.increment_miss();
                None
            }
        }
    }

    fn get_or_discard(&self, item: &Entry<K, V, P>) -> Option<V> {
        if self.inner.policy.should_discard(item) {
            self.evict(item);
            self.inner.telemetry.increment_miss();
            return None;
        }

        match item.read() {
            Some(value) => {
                self.inner.policy.touch(item);
                self.inner.telemetry.increment_hit();
                Some(value)
            }
            // Lost a race with removal
            None => {
                self.inner.telemetry.increment_miss();
                None
            }
        }
    }

    /// Return the cached value for `key`, creating it with `factory` on a miss.
    ///
    /// The factory runs outside any lock, so concurrent callers may each run
    /// it for the same key. Exactly one value is published; every losing value
    /// is disposed and its caller returns the published one.
    pub fn get_or_add<F>(&self, key: K, mut factory: F) -> V
    where
        F: FnMut(&K) -> V,
    {
        loop {
            if let Some(value) = self.try_get(&key) {
                return value;
            }

            let value = factory(&key);
            let published = value.clone();
            match self.try_add(self.inner.policy.create_item(key.clone(), value)) {
                Ok(_) => return published,
                Err(item) => self.inner.disposer.dispose(&item.into_value()),
            }
        }
    }

    /// Async variant of [`get_or_add`](Self::get_or_add).
    ///
    /// No lock is held across the factory's await points.
    pub async fn get_or_add_async<F, Fut>(&self, key: K, mut factory: F) -> V
    where
        F: FnMut(K) -> Fut,
        Fut: Future<Output = V>,
    {
        loop {
            if let Some(value) = self.try_get(&key) {
                return value;
            }

            let value = factory(key.clone()).await;
            let published = value.clone();
            match self.try_add(self.inner.policy.create_item(key.clone(), value)) {
                Ok(_) => return published,
                Err(item) => self.inner.disposer.dispose(&item.into_value()),
            }
        }
    }
}
