//! Telemetry policies: hit/miss counting and removal notifications
//!
//! [`NoTelemetry`] is a zero-sized policy whose methods compile to nothing.
//! [`Telemetry`] keeps atomic counters and fans removal events out to
//! registered listeners.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRemovedReason {
    /// Removed through the public API (`try_remove`, `clear`).
    Removed,
    /// Evicted by cycling, either for capacity or because it expired.
    Evicted,
}

/// Notification raised when an entry leaves the cache.
#[derive(Debug)]
pub struct ItemRemovedEvent<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
    pub reason: ItemRemovedReason,
}

/// Callback invoked for every removal.
///
/// Listeners run inside the removed entry's critical section and must not
/// block.
pub type RemovalListener<K, V> = Arc<dyn Fn(&ItemRemovedEvent<'_, K, V>) + Send + Sync>;

/// Telemetry policy trait
pub trait TelemetryPolicy<K, V>: Send + Sync {
    fn increment_miss(&self);

    fn increment_hit(&self);

    fn on_item_removed(&self, key: &K, value: &V, reason: ItemRemovedReason);

    /// Ratio of hits to lookups, where 1.0 means every lookup hit.
    fn hit_ratio(&self) -> f64;
}

/// Telemetry policy that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTelemetry;

impl<K, V> TelemetryPolicy<K, V> for NoTelemetry {
    #[inline(always)]
    fn increment_miss(&self) {}

    #[inline(always)]
    fn increment_hit(&self) {}

    #[inline(always)]
    fn on_item_removed(&self, _key: &K, _value: &V, _reason: ItemRemovedReason) {}

    #[inline(always)]
    fn hit_ratio(&self) -> f64 {
        0.0
    }
}

/// Counting telemetry policy with removal listeners
pub struct Telemetry<K, V> {
    hits: AtomicU64,
    misses: AtomicU64,
    listeners: RwLock<Vec<RemovalListener<K, V>>>,
}

impl<K, V> Telemetry<K, V> {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Register a listener for removal notifications.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ItemRemovedEvent<'_, K, V>) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl<K, V> Default for Telemetry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Telemetry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<K, V> TelemetryPolicy<K, V> for Telemetry<K, V> {
    fn increment_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn on_item_removed(&self, key: &K, value: &V, reason: ItemRemovedReason) {
        // Snapshot so a listener may subscribe further listeners without deadlocking
        let listeners: Vec<_> = self.listeners.read().iter().cloned().collect();
        if listeners.is_empty() {
            return;
        }

        let event = ItemRemovedEvent { key, value, reason };
        for listener in &listeners {
            listener(&event);
        }
    }

    fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
