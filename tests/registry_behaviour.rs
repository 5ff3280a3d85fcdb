//! Observable behaviour of the route registry.

use std::time::Duration;

mod common;
use common::{assert_no_empty_routes, endpoint, manual_registry, uri};

const THRESHOLD: Duration = Duration::from_secs(120);

#[tokio::test(start_paused = true)]
async fn test_repeated_registration_keeps_one_fresh_entry() {
    let registry = manual_registry(Duration::from_secs(10));

    for _ in 0..3 {
        registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80));
        tokio::time::advance(Duration::from_secs(6)).await;
    }
    registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80));

    assert_eq!(registry.lookup(&uri("foo.com")).unwrap().len(), 1);

    // Freshness comes from the last call, not the first.
    tokio::time::advance(Duration::from_secs(8)).await;
    assert_eq!(registry.prune_stale_endpoints().pruned_endpoints, 0);
    tokio::time::advance(Duration::from_secs(3)).await;
    assert_eq!(registry.prune_stale_endpoints().pruned_endpoints, 1);
}

#[test]
fn test_case_insensitive_lookup() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("Foo.Com"), endpoint("10.0.0.1", 80));

    let pool = registry.lookup(&uri("foo.com")).unwrap();
    assert!(pool.contains("10.0.0.1:80"));
    assert!(registry.lookup(&uri("FOO.COM")).is_some());
}

#[test]
fn test_unregister_restores_route_count() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("bar.com"), endpoint("10.0.0.9", 80));
    let before = registry.num_uris();

    registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80));
    registry.unregister(&uri("foo.com"), &endpoint("10.0.0.1", 80));

    assert_eq!(registry.num_uris(), before);
    assert!(registry.lookup(&uri("foo.com")).is_none());
    assert_no_empty_routes(&registry);
}

#[test]
fn test_wildcard_fallback_order() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("*.example.com"), endpoint("10.0.0.1", 80));

    assert_eq!(
        registry.lookup(&uri("a.example.com")).unwrap().uri().as_str(),
        "*.example.com"
    );
    assert!(registry.lookup(&uri("a.b.example.com")).is_some());
    assert!(registry.lookup(&uri("a.other.com")).is_none());
}

#[test]
fn test_wildcard_with_path() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("*.example.com/api"), endpoint("10.0.0.1", 80));

    assert!(registry.lookup(&uri("foo.example.com/api")).is_some());
    assert!(registry.lookup(&uri("foo.example.com/web")).is_none());
    assert!(registry.lookup(&uri("foo.example.com")).is_none());
}

#[test]
fn test_exact_beats_wildcard() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("foo.example.com"), endpoint("10.0.0.1", 80));
    registry.register(&uri("*.example.com"), endpoint("10.0.0.2", 80));

    let pool = registry.lookup(&uri("foo.example.com")).unwrap();
    assert!(pool.contains("10.0.0.1:80"));
    assert!(!pool.contains("10.0.0.2:80"));
}

#[tokio::test(start_paused = true)]
async fn test_stale_endpoint_and_route_are_evicted() {
    let registry = manual_registry(Duration::from_secs(30));
    registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80));
    registry.register(&uri("bar.com"), endpoint("10.0.0.2", 80));
    registry.register(&uri("bar.com"), endpoint("10.0.0.3", 80));

    tokio::time::advance(Duration::from_secs(20)).await;
    registry.register(&uri("bar.com"), endpoint("10.0.0.3", 80));
    tokio::time::advance(Duration::from_secs(11)).await;

    let report = registry.prune_stale_endpoints();
    assert_eq!(report.pruned_endpoints, 2);
    assert_eq!(report.pruned_routes, 1);

    assert!(registry.lookup(&uri("foo.com")).is_none());
    let bar = registry.lookup(&uri("bar.com")).unwrap();
    assert_eq!(bar.len(), 1);
    assert!(bar.contains("10.0.0.3:80"));
    assert_no_empty_routes(&registry);
}

#[test]
fn test_distinct_address_counting() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80));
    registry.register(&uri("bar.com"), endpoint("10.0.0.1", 80));

    assert_eq!(registry.num_endpoints(), 1);
    assert_eq!(registry.num_uris(), 2);
}

#[test]
fn test_metadata_overwritten_on_reregistration() {
    let registry = manual_registry(THRESHOLD);
    registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80).with_app_id("old"));
    registry.register(&uri("foo.com"), endpoint("10.0.0.1", 80).with_app_id("new"));

    let pool = registry.lookup(&uri("foo.com")).unwrap();
    let stored: Vec<_> = pool.endpoints().collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].app_id(), Some("new"));
}
