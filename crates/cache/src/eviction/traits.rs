//! Core item policy trait definition

use crate::item::LruItem;

/// Where the cycling algorithm sends an item dequeued from a segment tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemDestination {
    Warm,
    Cold,
    Remove,
}

/// Item policy trait
///
/// Decides per-entry eviction eligibility and queue routing. Policies are
/// selected at construction as a type parameter of the cache, so the calls
/// below are statically dispatched.
pub trait ItemPolicy<K, V>: Send + Sync {
    /// Per-entry metadata the policy needs (for example a creation instant).
    type Stamp: Send + Sync;

    /// Create a new entry for `key`.
    fn create_item(&self, key: K, value: V) -> LruItem<K, V, Self::Stamp>;

    /// Whether a present entry must be treated as a miss.
    fn should_discard(&self, item: &LruItem<K, V, Self::Stamp>) -> bool;

    /// Record a successful read.
    fn touch(&self, item: &LruItem<K, V, Self::Stamp>) {
        item.set_accessed(true);
    }

    /// Route an item leaving the hot segment.
    fn route_hot(&self, item: &LruItem<K, V, Self::Stamp>) -> ItemDestination;

    /// Route an item leaving the warm segment.
    fn route_warm(&self, item: &LruItem<K, V, Self::Stamp>) -> ItemDestination;

    /// Route an item leaving the cold segment.
    fn route_cold(&self, item: &LruItem<K, V, Self::Stamp>) -> ItemDestination;
}
