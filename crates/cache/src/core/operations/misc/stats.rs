//! Occupancy and configuration views

use crate::eviction::{ItemPolicy, TLruPolicy};
use crate::telemetry::{ItemRemovedEvent, Telemetry, TelemetryPolicy};
use std::hash::Hash;

use super::super::super::capacity::SegmentCapacity;
use super::super::super::types::SegmentedCache;

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    /// Number of entries currently in the key map.
    pub fn len(&self) -> usize {
        self.inner.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.map.is_empty()
    }

    /// Total configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity.total()
    }

    pub fn segment_capacity(&self) -> SegmentCapacity {
        self.inner.capacity
    }

    /// Hot segment occupancy. Entries removed through the API are counted
    /// until cycling reaches them.
    pub fn hot_count(&self) -> usize {
        self.inner.hot.count().max(0) as usize
    }

    pub fn warm_count(&self) -> usize {
        self.inner.warm.count().max(0) as usize
    }

    pub fn cold_count(&self) -> usize {
        self.inner.cold.count().max(0) as usize
    }

    /// Whether `key` is present, without counting a lookup or marking it accessed.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.map.contains_key(key)
    }

    /// Snapshot of the keys currently present.
    pub fn keys(&self) -> Vec<K> {
        self.inner
            .map
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn policy(&self) -> &P {
        &self.inner.policy
    }

    pub fn telemetry(&self) -> &T {
        &self.inner.telemetry
    }
}

impl<K, V> SegmentedCache<K, V, TLruPolicy, Telemetry<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Ratio of hits to lookups, where 1.0 means every lookup hit.
    pub fn hit_ratio(&self) -> f64 {
        self.inner.telemetry.hit_ratio()
    }

    /// Register a listener for removal and eviction notifications.
    pub fn on_item_removed<F>(&self, listener: F)
    where
        F: Fn(&ItemRemovedEvent<'_, K, V>) + Send + Sync + 'static,
    {
        self.inner.telemetry.subscribe(listener);
    }
}
