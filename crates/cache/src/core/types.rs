//! Core cache types and structures

use crate::dispose::Disposer;
use crate::eviction::{ItemPolicy, LruPolicy, TLruPolicy};
use crate::item::LruItem;
use crate::telemetry::{NoTelemetry, Telemetry};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

use super::capacity::SegmentCapacity;
use super::segment::Segment;

/// Shared handle to an entry, as stored in both the map and the segments.
pub(crate) type Entry<K, V, P> = Arc<LruItem<K, V, <P as ItemPolicy<K, V>>::Stamp>>;

/// Pseudo-LRU cache composed of three segments: hot, warm and cold
///
/// New entries enter hot. Reads only flag an entry as accessed; the cost of
/// keeping recency order is paid on insert, where each segment that exceeds
/// its capacity gives up its tail entry:
///
/// 1. hot tail moves to warm if it was accessed, otherwise to cold;
/// 2. warm tail moves back to warm if it was accessed, otherwise to cold;
/// 3. cold tail moves to warm if it was accessed, otherwise it is evicted.
///
/// Moving an entry clears its accessed flag. There is no global lock: the
/// key map is a [`DashMap`], the segments are lock-free queues, and the only
/// mutual exclusion is the per-entry lock that serializes value disposal.
///
/// Cloning the cache is cheap and yields another handle to the same store.
pub struct SegmentedCache<K, V, P = LruPolicy, T = NoTelemetry>
where
    P: ItemPolicy<K, V>,
{
    pub(super) inner: Arc<CacheInner<K, V, P, T>>,
}

pub(super) struct CacheInner<K, V, P, T>
where
    P: ItemPolicy<K, V>,
{
    /// Key to entry map; a key is present at most once
    pub map: DashMap<K, Entry<K, V, P>>,
    /// Newly inserted entries
    pub hot: Segment<Entry<K, V, P>>,
    /// Entries that were read while in hot or cold
    pub warm: Segment<Entry<K, V, P>>,
    /// Eviction candidates
    pub cold: Segment<Entry<K, V, P>>,
    pub capacity: SegmentCapacity,
    pub policy: P,
    pub telemetry: T,
    pub disposer: Box<dyn Disposer<V>>,
}

/// Recency-only cache without telemetry.
pub type ConcurrentLru<K, V> = SegmentedCache<K, V, LruPolicy, NoTelemetry>;

/// Time-aware cache with hit counting and removal notifications.
pub type ConcurrentTLru<K, V> = SegmentedCache<K, V, TLruPolicy, Telemetry<K, V>>;

impl<K, V, P, T> Clone for SegmentedCache<K, V, P, T>
where
    P: ItemPolicy<K, V>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, P, T> fmt::Debug for SegmentedCache<K, V, P, T>
where
    P: ItemPolicy<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentedCache")
            .field("capacity", &self.inner.capacity)
            .field("hot", &self.inner.hot.count())
            .field("warm", &self.inner.warm.count())
            .field("cold", &self.inner.cold.count())
            .finish_non_exhaustive()
    }
}
