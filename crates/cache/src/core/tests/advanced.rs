//! Overflow and concurrency tests

use crate::core::{ConcurrentLru, SegmentedCache};
use crate::dispose::DisposeFn;
use crate::eviction::LruPolicy;
use crate::telemetry::NoTelemetry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_warm_overflow_is_bounded_and_settles() {
    let cache = ConcurrentLru::lru(9).unwrap();
    for key in 1..=6u32 {
        cache.add_or_update(key, key);
        cache.try_get(&key);
    }
    for key in 1..=6u32 {
        assert_eq!(cache.try_get(&key), Some(key));
    }

    cache.add_or_update(7, 7);

    // Warm may hold one entry beyond its capacity between inserts
    assert_eq!(cache.warm_count(), 4);
    assert!(cache.len() <= cache.capacity() + 1);

    cache.settle();
    let split = cache.segment_capacity();
    assert!(cache.hot_count() <= split.hot);
    assert!(cache.warm_count() <= split.warm);
    assert!(cache.cold_count() <= split.cold);
    assert!(cache.len() <= cache.capacity());
}

#[test]
fn test_concurrent_get_or_add_publishes_one_value() {
    const THREADS: usize = 8;

    let disposed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&disposed);
    let cache: SegmentedCache<&str, usize> = SegmentedCache::with_disposer(
        9,
        LruPolicy,
        NoTelemetry,
        DisposeFn(move |_: &usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();

    // Every thread is inside the factory before any of them publishes
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let cache = cache.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                cache.get_or_add("shared", |_| {
                    barrier.wait();
                    id
                })
            })
        })
        .collect();

    let results: Vec<usize> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let published = cache.try_get(&"shared").unwrap();
    assert!(results.iter().all(|value| *value == published));
    assert_eq!(disposed.load(Ordering::SeqCst), THREADS - 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_stress_keeps_accounting_consistent() {
    const THREADS: usize = 8;
    const OPS: usize = 2_000;
    const KEYS: u64 = 200;

    let created = Arc::new(AtomicUsize::new(0));
    let disposed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&disposed);
    let cache: SegmentedCache<u64, u64> = SegmentedCache::with_disposer(
        30,
        LruPolicy,
        NoTelemetry,
        DisposeFn(move |_: &u64| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();

    let handles: Vec<_> = (0..THREADS as u64)
        .map(|seed| {
            let cache = cache.clone();
            let created = Arc::clone(&created);
            thread::spawn(move || {
                let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                for _ in 0..OPS {
                    state = state
                        .wrapping_mul(6364136223846793005)
                        .wrapping_add(1442695040888963407);
                    let key = (state >> 33) % KEYS;
                    match state % 4 {
                        0 => {
                            cache.try_remove(&key);
                        }
                        1 => {
                            created.fetch_add(1, Ordering::SeqCst);
                            cache.add_or_update(key, key);
                        }
                        _ => {
                            let value = cache.get_or_add(key, |k| {
                                created.fetch_add(1, Ordering::SeqCst);
                                *k
                            });
                            assert_eq!(value, key);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    cache.settle();
    assert!(cache.len() <= cache.capacity());

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(
        created.load(Ordering::SeqCst),
        disposed.load(Ordering::SeqCst),
        "every created value is disposed exactly once"
    );
}

#[test]
fn test_clones_share_the_same_store() {
    let cache = ConcurrentLru::lru(3).unwrap();
    let other = cache.clone();
    cache.add_or_update("k", 1);
    assert_eq!(other.try_get(&"k"), Some(1));
    assert!(format!("{other:?}").contains("SegmentedCache"));
}
