//! Cache clear operation

use crate::eviction::ItemPolicy;
use crate::telemetry::TelemetryPolicy;
use std::hash::Hash;

use super::super::super::types::SegmentedCache;

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    /// Remove every entry, disposing each value once.
    ///
    /// Entries inserted concurrently with a clear may or may not survive it.
    pub fn clear(&self) {
        let keys = self.keys();
        let mut removed = 0usize;
        for key in &keys {
            if self.try_remove(key) {
                removed += 1;
            }
        }

        // Drain the queues of the entries just removed
        let queued = self.inner.hot.count() + self.inner.warm.count() + self.inner.cold.count();
        let passes = keys.len().max(queued.max(0) as usize);
        for _ in 0..passes {
            self.cycle_hot_unchecked();
            self.cycle_warm_unchecked();
            self.cycle_cold_unchecked();
        }

        tracing::debug!(removed, "cleared cache");
    }
}
