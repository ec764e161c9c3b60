//! Cache remove operation

use crate::eviction::ItemPolicy;
use crate::telemetry::{ItemRemovedReason, TelemetryPolicy};
use std::hash::Hash;
use std::sync::Arc;

use super::super::types::SegmentedCache;

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    /// Remove an entry from the cache
    ///
    /// Returns `true` if this call removed it. The value is disposed once and
    /// a `Removed` notification is raised. The entry stays in its segment
    /// queue until cycling reaches and discards it.
    pub fn try_remove(&self, key: &K) -> bool {
        loop {
            let Some(item) = self.inner.map.get(key).map(|entry| Arc::clone(entry.value())) else {
                return false;
            };

            // The key may have been re-added between the lookup and here;
            // only the entry we looked at is removed.
            if self
                .inner
                .map
                .remove_if(key, |_, current| Arc::ptr_eq(current, &item))
                .is_some()
            {
                self.retire(&item, ItemRemovedReason::Removed);
                return true;
            }
        }
    }

    /// Remove the entry for `key` only if its current value satisfies
    /// `predicate`.
    ///
    /// The predicate runs inside the entry's critical section, so an update
    /// racing with this call is either seen by the predicate or lands after
    /// the removal.
    pub fn try_remove_if<F>(&self, key: &K, mut predicate: F) -> bool
    where
        F: FnMut(&V) -> bool,
    {
        loop {
            let Some(item) = self.inner.map.get(key).map(|entry| Arc::clone(entry.value())) else {
                return false;
            };

            let current = item.lock();
            if item.was_removed() || !predicate(&current) {
                return false;
            }
            let removed = self
                .inner
                .map
                .remove_if(key, |_, entry| Arc::ptr_eq(entry, &item))
                .is_some();
            drop(current);

            if removed {
                self.retire(&item, ItemRemovedReason::Removed);
                return true;
            }
        }
    }
}
