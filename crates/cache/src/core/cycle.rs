//! Segment cycling and entry retirement
//!
//! Every successful insert cycles the segments once. A cycle is bounded: it
//! moves at most five entries (hot once, warm twice, cold twice), so the work
//! an insert does never depends on cache size. Racing cyclers may each move an
//! entry when a segment is exactly at capacity; the counts still converge
//! because every dequeue is paired with exactly one enqueue or retirement.

use crate::eviction::{ItemDestination, ItemPolicy};
use crate::telemetry::{ItemRemovedReason, TelemetryPolicy};
use std::hash::Hash;
use std::sync::Arc;

use super::types::{Entry, SegmentedCache};

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    pub(super) fn cycle(&self) {
        self.cycle_hot();

        // Under heavy read traffic warm and cold can briefly overshoot; the
        // second pass keeps them stable.
        self.cycle_warm();
        self.cycle_warm();
        self.cycle_cold();
        self.cycle_cold();
    }

    /// Cycle until no segment exceeds its capacity.
    ///
    /// Reads can leave warm one entry over capacity between inserts. Once
    /// settled, and with no concurrent writers, `len() <= capacity()` holds.
    pub fn settle(&self) {
        // Every move clears the accessed flag, so each entry can be recycled
        // in place at most once before it sinks a segment.
        let total = self.inner.hot.count() + self.inner.warm.count() + self.inner.cold.count();
        let bound = 3 * total.max(0) as usize + 3;

        for _ in 0..bound {
            if self.is_settled() {
                return;
            }
            self.cycle();
        }
    }

    fn is_settled(&self) -> bool {
        !self.inner.hot.is_over_capacity()
            && !self.inner.warm.is_over_capacity()
            && !self.inner.cold.is_over_capacity()
    }

    fn cycle_hot(&self) {
        if self.inner.hot.is_over_capacity() {
            self.cycle_hot_unchecked();
        }
    }

    fn cycle_warm(&self) {
        if self.inner.warm.is_over_capacity() {
            self.cycle_warm_unchecked();
        }
    }

    fn cycle_cold(&self) {
        if self.inner.cold.is_over_capacity() {
            self.cycle_cold_unchecked();
        }
    }

    pub(super) fn cycle_hot_unchecked(&self) {
        if let Some(item) = self.inner.hot.dequeue() {
            let destination = self.inner.policy.route_hot(&item);
            self.move_item(item, destination);
        }
    }

    pub(super) fn cycle_warm_unchecked(&self) {
        if let Some(item) = self.inner.warm.dequeue() {
            // Warm tolerates a single entry of overflow before demoting
            let destination = match self.inner.policy.route_warm(&item) {
                ItemDestination::Warm if self.inner.warm.is_within_capacity() => {
                    ItemDestination::Warm
                }
                ItemDestination::Remove => ItemDestination::Remove,
                _ => ItemDestination::Cold,
            };
            self.move_item(item, destination);
        }
    }

    pub(super) fn cycle_cold_unchecked(&self) {
        if let Some(item) = self.inner.cold.dequeue() {
            let destination = match self.inner.policy.route_cold(&item) {
                ItemDestination::Warm if self.inner.warm.is_within_capacity() => {
                    ItemDestination::Warm
                }
                _ => ItemDestination::Remove,
            };
            self.move_item(item, destination);
        }
    }

    fn move_item(&self, item: Entry<K, V, P>, destination: ItemDestination) {
        // Entries removed through the API linger in their queue until they
        // reach the tail; drop them here instead of recirculating.
        if item.was_removed() {
            return;
        }

        item.set_accessed(false);

        match destination {
            ItemDestination::Warm => self.inner.warm.enqueue(item),
            ItemDestination::Cold => self.inner.cold.enqueue(item),
            ItemDestination::Remove => self.evict(&item),
        }
    }

    /// Remove `item` from the map if the map still holds that very entry.
    ///
    /// A concurrent `try_remove` or a replacement under the same key makes
    /// this a no-op, so each entry is retired at most once.
    pub(super) fn evict(&self, item: &Entry<K, V, P>) {
        let removed = self
            .inner
            .map
            .remove_if(item.key(), |_, current| Arc::ptr_eq(current, item))
            .is_some();

        if removed {
            tracing::trace!("evicting cache entry");
            self.retire(item, ItemRemovedReason::Evicted);
        }
    }

    /// Mark the entry removed, notify telemetry and dispose its value.
    ///
    /// Runs inside the entry's critical section so a concurrent update cannot
    /// swap the value between notification and disposal.
    pub(super) fn retire(&self, item: &Entry<K, V, P>, reason: ItemRemovedReason) {
        let value = item.lock();
        item.mark_removed();
        self.inner
            .telemetry
            .on_item_removed(item.key(), &value, reason);
        self.inner.disposer.dispose(&value);
    }
}
