//! Cache construction

use crate::dispose::{Disposer, NoopDisposer};
use crate::errors::Result;
use crate::eviction::{ItemPolicy, LruPolicy, TLruPolicy};
use crate::telemetry::{NoTelemetry, Telemetry, TelemetryPolicy};
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use super::capacity::SegmentCapacity;
use super::segment::Segment;
use super::types::{CacheInner, SegmentedCache};

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    /// Create a cache holding at most `capacity` entries at rest.
    ///
    /// Fails with [`CacheError::InvalidCapacity`](crate::CacheError::InvalidCapacity)
    /// when `capacity` is below three, since every segment needs room for at
    /// least one entry.
    pub fn new(capacity: usize, policy: P, telemetry: T) -> Result<Self> {
        Self::with_disposer(capacity, policy, telemetry, NoopDisposer)
    }

    /// Create a cache that hands every value leaving it to `disposer`.
    pub fn with_disposer<D>(capacity: usize, policy: P, telemetry: T, disposer: D) -> Result<Self>
    where
        D: Disposer<V> + 'static,
    {
        let split = SegmentCapacity::split(capacity)?;
        tracing::debug!(
            capacity,
            hot = split.hot,
            warm = split.warm,
            cold = split.cold,
            "creating segmented cache"
        );

        Ok(Self {
            inner: Arc::new(CacheInner {
                map: DashMap::with_capacity(capacity),
                hot: Segment::new(split.hot),
                warm: Segment::new(split.warm),
                cold: Segment::new(split.cold),
                capacity: split,
                policy,
                telemetry,
                disposer: Box::new(disposer),
            }),
        })
    }
}

impl<K, V> SegmentedCache<K, V, LruPolicy, NoTelemetry>
where
    K: Eq + Hash + Clone,
{
    /// Recency-only cache without telemetry.
    pub fn lru(capacity: usize) -> Result<Self> {
        Self::new(capacity, LruPolicy, NoTelemetry)
    }
}

impl<K, V> SegmentedCache<K, V, TLruPolicy, Telemetry<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Time-aware cache with telemetry; entries expire after `time_to_live`.
    pub fn tlru(capacity: usize, time_to_live: Duration) -> Result<Self> {
        Self::new(capacity, TLruPolicy::new(time_to_live)?, Telemetry::new())
    }
}
