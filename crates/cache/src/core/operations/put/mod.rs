//! Cache insert and update operations

use crate::eviction::ItemPolicy;
use crate::item::LruItem;
use crate::telemetry::TelemetryPolicy;
use dashmap::mapref::entry::Entry as MapEntry;
use std::hash::Hash;
use std::sync::Arc;

use super::super::types::{Entry, SegmentedCache};

impl<K, V, P, T> SegmentedCache<K, V, P, T>
where
    K: Eq + Hash + Clone,
    P: ItemPolicy<K, V>,
    T: TelemetryPolicy<K, V>,
{
    /// Publish `item` if its key is absent, then cycle.
    ///
    /// Hands the item back untouched when the key is already present.
    pub(in crate::core) fn try_add(
        &self,
        item: LruItem<K, V, P::Stamp>,
    ) -> Result<Entry<K, V, P>, LruItem<K, V, P::Stamp>> {
        // The map shard lock must be released before cycling, which may
        // remove keys from the same shard.
        let entry = match self.inner.map.entry(item.key().clone()) {
            MapEntry::Occupied(_) => return Err(item),
            MapEntry::Vacant(slot) => {
                let entry = Arc::new(item);
                slot.insert(Arc::clone(&entry));
                entry
            }
        };

        self.inner.hot.enqueue(Arc::clone(&entry));
        self.cycle();
        Ok(entry)
    }

    /// Swap the value of a live entry, disposing the previous value.
    ///
    /// Gives the value back when there is no live entry to update. An
    /// expired entry is evicted and counts as absent, so an insert that
    /// follows gets a fresh stamp.
    fn update_inner(&self, key: &K, value: V) -> Result<(), V> {
        let Some(item) = self.inner.map.get(key).map(|entry| Arc::clone(entry.value())) else {
            return Err(value);
        };

        if self.inner.policy.should_discard(&item) {
            self.evict(&item);
            return Err(value);
        }

        let mut current = item.lock();
        if item.was_removed() {
            return Err(value);
        }

        let previous = std::mem::replace(&mut *current, value);
        self.inner.disposer.dispose(&previous);
        Ok(())
    }

    /// Replace the value stored under `key`.
    ///
    /// Returns `false` when the key is absent, in which case nothing is
    /// inserted. Updating neither marks the entry accessed nor moves it.
    pub fn try_update(&self, key: &K, value: V) -> bool {
        self.update_inner(key, value).is_ok()
    }

    /// Update `key` if present, otherwise insert it.
    pub fn add_or_update(&self, key: K, value: V) {
        let mut value = value;
        loop {
            match self.update_inner(&key, value) {
                Ok(()) => return,
                Err(rejected) => value = rejected,
            }

            match self.try_add(self.inner.policy.create_item(key.clone(), value)) {
                Ok(_) => return,
                Err(item) => value = item.into_value(),
            }
        }
    }
}
