//! Entries held by the segmented cache
//!
//! An [`LruItem`] is shared between the key map and exactly one segment queue
//! at a time. Its value sits behind a per-entry mutex: that lock is the only
//! critical section the cache ever takes, and it serializes value swaps with
//! disposal so an update racing a removal can never dispose a value twice.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cached key/value pair plus the bookkeeping the cycling algorithm needs.
///
/// `S` is the item policy's stamp: `()` for plain LRU, the creation instant
/// for the time-aware policy.
pub struct LruItem<K, V, S = ()> {
    key: K,
    value: Mutex<V>,
    was_accessed: AtomicBool,
    was_removed: AtomicBool,
    stamp: S,
}

impl<K, V, S> LruItem<K, V, S> {
    pub fn new(key: K, value: V, stamp: S) -> Self {
        Self {
            key,
            value: Mutex::new(value),
            was_accessed: AtomicBool::new(false),
            was_removed: AtomicBool::new(false),
            stamp,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Policy metadata captured at creation.
    pub fn stamp(&self) -> &S {
        &self.stamp
    }

    /// Whether the item was read since it last moved between segments.
    pub fn was_accessed(&self) -> bool {
        self.was_accessed.load(Ordering::Relaxed)
    }

    pub fn set_accessed(&self, accessed: bool) {
        self.was_accessed.store(accessed, Ordering::Relaxed);
    }

    /// Whether the item has left the cache. Once set this never clears.
    pub fn was_removed(&self) -> bool {
        self.was_removed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_removed(&self) {
        self.was_removed.store(true, Ordering::Release);
    }

    /// Enter the per-entry critical section.
    pub(crate) fn lock(&self) -> MutexGuard<'_, V> {
        self.value.lock()
    }

    /// Clone the value unless the item has already been removed.
    pub(crate) fn read(&self) -> Option<V>
    where
        V: Clone,
    {
        let guard = self.value.lock();
        if self.was_removed() {
            None
        } else {
            Some(guard.clone())
        }
    }

    pub(crate) fn into_value(self) -> V {
        self.value.into_inner()
    }
}

impl<K: fmt::Debug, V, S> fmt::Debug for LruItem<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruItem")
            .field("key", &self.key)
            .field("was_accessed", &self.was_accessed())
            .field("was_removed", &self.was_removed())
            .finish_non_exhaustive()
    }
}
