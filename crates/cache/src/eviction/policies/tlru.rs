//! Time-aware LRU item policy implementation

use crate::errors::{CacheError, Result};
use crate::eviction::traits::{ItemDestination, ItemPolicy};
use crate::item::LruItem;
use std::time::{Duration, Instant};

/// Recency policy with a fixed time-to-live
///
/// An entry older than `time_to_live` is discarded on the next read even if
/// it is still physically present, and is routed straight to removal when
/// cycling reaches it.
#[derive(Debug, Clone, Copy)]
pub struct TLruPolicy {
    time_to_live: Duration,
}

impl TLruPolicy {
    /// Create a policy; a zero time-to-live is rejected.
    pub fn new(time_to_live: Duration) -> Result<Self> {
        if time_to_live.is_zero() {
            return Err(CacheError::configuration("time to live must be non-zero"));
        }
        Ok(Self { time_to_live })
    }

    pub fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    #[inline]
    fn is_expired<K, V>(&self, item: &LruItem<K, V, Instant>) -> bool {
        item.stamp().elapsed() > self.time_to_live
    }
}

impl<K, V> ItemPolicy<K, V> for TLruPolicy {
    type Stamp = Instant;

    #[inline]
    fn create_item(&self, key: K, value: V) -> LruItem<K, V, Instant> {
        LruItem::new(key, value, Instant::now())
    }

    #[inline]
    fn should_discard(&self, item: &LruItem<K, V, Instant>) -> bool {
        self.is_expired(item)
    }

    fn route_hot(&self, item: &LruItem<K, V, Instant>) -> ItemDestination {
        if self.is_expired(item) {
            ItemDestination::Remove
        } else if item.was_accessed() {
            ItemDestination::Warm
        } else {
            ItemDestination::Cold
        }
    }

    fn route_warm(&self, item: &LruItem<K, V, Instant>) -> ItemDestination {
        if self.is_expired(item) {
            ItemDestination::Remove
        } else if item.was_accessed() {
            ItemDestination::Warm
        } else {
            ItemDestination::Cold
        }
    }

    fn route_cold(&self, item: &LruItem<K, V, Instant>) -> ItemDestination {
        if self.is_expired(item) {
            ItemDestination::Remove
        } else if item.was_accessed() {
            ItemDestination::Warm
        } else {
            ItemDestination::Remove
        }
    }
}
