//! Tests for item policies

use super::*;
use std::thread;
use std::time::Duration;

#[test]
fn test_lru_routes_by_access() {
    let policy = LruPolicy::new();
    let item = ItemPolicy::<&str, i32>::create_item(&policy, "a", 1);

    assert!(!policy.should_discard(&item));
    assert_eq!(policy.route_hot(&item), ItemDestination::Cold);
    assert_eq!(policy.route_warm(&item), ItemDestination::Cold);
    assert_eq!(policy.route_cold(&item), ItemDestination::Remove);

    policy.touch(&item);
    assert!(item.was_accessed());
    assert_eq!(policy.route_hot(&item), ItemDestination::Warm);
    assert_eq!(policy.route_warm(&item), ItemDestination::Warm);
    assert_eq!(policy.route_cold(&item), ItemDestination::Warm);
}

#[test]
fn test_lru_never_discards() {
    let policy = LruPolicy::new();
    let item = ItemPolicy::<u32, u32>::create_item(&policy, 7, 7);
    thread::sleep(Duration::from_millis(5));
    assert!(!policy.should_discard(&item));
}

#[test]
fn test_tlru_rejects_zero_ttl() {
    assert!(TLruPolicy::new(Duration::ZERO).is_err());
}

#[test]
fn test_tlru_discards_after_ttl() {
    let policy = TLruPolicy::new(Duration::from_millis(30)).unwrap();
    let item = ItemPolicy::<&str, i32>::create_item(&policy, "a", 1);

    assert!(!policy.should_discard(&item));
    assert_eq!(policy.route_hot(&item), ItemDestination::Cold);

    policy.touch(&item);
    assert_eq!(policy.route_hot(&item), ItemDestination::Warm);

    thread::sleep(Duration::from_millis(60));

    assert!(policy.should_discard(&item));
    // Expired entries are removed from any segment, accessed or not
    assert_eq!(policy.route_hot(&item), ItemDestination::Remove);
    assert_eq!(policy.route_warm(&item), ItemDestination::Remove);
    assert_eq!(policy.route_cold(&item), ItemDestination::Remove);
}

#[test]
fn test_tlru_matches_lru_routing_while_fresh() {
    let lru = LruPolicy::new();
    let tlru = TLruPolicy::new(Duration::from_secs(60)).unwrap();

    for accessed in [false, true] {
        let a = ItemPolicy::<u8, u8>::create_item(&lru, 1, 1);
        let b = ItemPolicy::<u8, u8>::create_item(&tlru, 1, 1);
        a.set_accessed(accessed);
        b.set_accessed(accessed);

        assert_eq!(lru.route_hot(&a), tlru.route_hot(&b));
        assert_eq!(lru.route_warm(&a), tlru.route_warm(&b));
        assert_eq!(lru.route_cold(&a), tlru.route_cold(&b));
    }
}
