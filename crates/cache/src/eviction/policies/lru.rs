//! LRU (Least Recently Used) item policy implementation

use crate::eviction::traits::{ItemDestination, ItemPolicy};
use crate::item::LruItem;

/// Plain recency-based policy
///
/// Entries are never stale; they leave the cache only when cycling pushes an
/// unaccessed entry off the cold tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruPolicy;

impl LruPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl<K, V> ItemPolicy<K, V> for LruPolicy {
    type Stamp = ();

    #[inline]
    fn create_item(&self, key: K, value: V) -> LruItem<K, V> {
        LruItem::new(key, value, ())
    }

    #[inline]
    fn should_discard(&self, _item: &LruItem<K, V>) -> bool {
        false
    }

    fn route_hot(&self, item: &LruItem<K, V>) -> ItemDestination {
        if item.was_accessed() {
            ItemDestination::Warm
        } else {
            ItemDestination::Cold
        }
    }

    fn route_warm(&self, item: &LruItem<K, V>) -> ItemDestination {
        if item.was_accessed() {
            ItemDestination::Warm
        } else {
            ItemDestination::Cold
        }
    }

    fn route_cold(&self, item: &LruItem<K, V>) -> ItemDestination {
        if item.was_accessed() {
            ItemDestination::Warm
        } else {
            ItemDestination::Remove
        }
    }
}
