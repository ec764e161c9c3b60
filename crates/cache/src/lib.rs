//! Concurrent segmented cache for netcache
//!
//! This crate provides a bounded, thread-safe pseudo-LRU cache with:
//! - Hot, warm and cold segments cycled on insert, so reads never reorder
//! - Pluggable item policies (plain recency, or recency with a time-to-live)
//! - Optional hit/miss telemetry and removal notifications
//! - Exactly-once disposal of values leaving the cache
//! - Reference-counted lifetimes for values that need cleanup

pub mod config;
pub mod core;
pub mod dispose;
pub mod errors;
pub mod eviction;
pub mod item;
pub mod scoped;
pub mod telemetry;

pub use config::CacheConfig;
pub use self::core::{ConcurrentLru, ConcurrentTLru, SegmentCapacity, SegmentedCache};
pub use dispose::{DisposeFn, Disposer, NoopDisposer};
pub use errors::{CacheError, RecoveryHint, Result};
pub use eviction::*;
pub use item::LruItem;
pub use scoped::{Lifetime, ReferenceCount, Scoped, ScopedCache, ScopedDisposer};
pub use telemetry::{
    ItemRemovedEvent, ItemRemovedReason, NoTelemetry, RemovalListener, Telemetry,
    TelemetryPolicy,
};
