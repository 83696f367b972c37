use super::*;
use crate::testutil::{self, MemStore};
use std::sync::atomic::Ordering;
use std::time::Duration;

fn cache(capacity: usize) -> Arc<OrderCache> {
    Arc::new(OrderCache::new(capacity, Duration::from_secs(600)).unwrap())
}

#[tokio::test]
async fn cache_hit_skips_the_store() {
    let cache = cache(8);
    let store = Arc::new(MemStore::with_orders([testutil::order("A")]));
    cache.put(&testutil::order("A"));
    let query = OrderQuery::new(cache, store.clone());

    let order = query.get_by_id("A").await.unwrap();
    assert_eq!(order.order_uid, "A");
    assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cache_miss_falls_back_and_populates_the_cache() {
    let cache = cache(8);
    let store = Arc::new(MemStore::with_orders([testutil::order("A")]));
    let query = OrderQuery::new(cache.clone(), store.clone());

    assert!(query.get_by_id("A").await.is_ok());
    assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 1);

    // Second read is a hit; the store is not consulted again.
    assert!(query.get_by_id("A").await.is_ok());
    assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn store_not_found_is_authoritative() {
    let query = OrderQuery::new(cache(8), Arc::new(MemStore::default()));
    assert!(matches!(
        query.get_by_id("nope").await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn store_errors_propagate_to_the_caller() {
    let store = Arc::new(MemStore::default());
    store.fail_fetch.store(true, Ordering::SeqCst);
    let query = OrderQuery::new(cache(8), store);
    assert!(matches!(
        query.get_by_id("A").await,
        Err(StoreError::Database(_))
    ));
}

#[tokio::test]
async fn warm_cache_loads_every_stored_order() {
    let cache = cache(8);
    let store = MemStore::with_orders(["A", "B", "C"].map(testutil::order));

    let loaded = warm_cache(&store, &cache).await.unwrap();
    assert_eq!(loaded, 3);
    assert_eq!(cache.len(), 3);

    // Bootstrap scenario: a lookup after warm-up is served without a store
    // call.
    let query = OrderQuery::new(cache, Arc::new(store));
    let order = query.get_by_id("B").await.unwrap();
    assert_eq!(order.order_uid, "B");
}

#[tokio::test]
async fn warm_cache_beyond_capacity_keeps_most_recent_and_falls_back_for_the_rest() {
    let cache = cache(2);
    let store = Arc::new(MemStore::with_orders(["A", "B", "C"].map(testutil::order)));
    warm_cache(store.as_ref(), &cache).await.unwrap();

    assert_eq!(cache.len(), 2);
    assert!(cache.get("A").is_none(), "oldest load should have been evicted");

    let query = OrderQuery::new(cache, store.clone());
    let calls_before = store.fetch_calls.load(Ordering::SeqCst);
    assert!(query.get_by_id("A").await.is_ok());
    assert!(store.fetch_calls.load(Ordering::SeqCst) > calls_before);
}

#[tokio::test]
async fn warm_cache_surfaces_store_failure() {
    let store = MemStore::default();
    store.fail_fetch.store(true, Ordering::SeqCst);
    assert!(warm_cache(&store, &cache(8)).await.is_err());
}
