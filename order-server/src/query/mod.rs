//! Lookup path and startup cache warm-up
//!
//! Cache-aside reads: the cache answers first, the durable store is the
//! authority on a miss, and a store hit is written back into the cache on
//! the way out.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use shared::Order;

use crate::cache::OrderCache;
use crate::store::{OrderStore, StoreError};

/// Read side of the service, shared by every HTTP handler task.
#[derive(Clone)]
pub struct OrderQuery {
    cache: Arc<OrderCache>,
    store: Arc<dyn OrderStore>,
}

impl OrderQuery {
    pub fn new(cache: Arc<OrderCache>, store: Arc<dyn OrderStore>) -> Self {
        Self { cache, store }
    }

    /// Fetch one order by uid.
    ///
    /// `StoreError::NotFound` from the fallback is the authoritative absence
    /// signal; a cache miss on its own never is. Populating the cache after
    /// a fallback hit is best-effort and cannot fail the request.
    pub async fn get_by_id(&self, uid: &str) -> Result<Order, StoreError> {
        if let Some(order) = self.cache.get(uid) {
            tracing::debug!(order_uid = uid, "cache hit");
            return Ok(order);
        }

        let order = self.store.fetch(uid).await?;
        self.cache.put(&order);
        tracing::debug!(order_uid = uid, "cache miss, served from store");
        Ok(order)
    }
}

/// Populate the cache from the durable store's full order set.
///
/// Runs once at startup, before the consumer loop commits new offsets and
/// before the query surface serves traffic. Any failure here is fatal to
/// startup; serving cold would break the latency profile the service
/// promises.
pub async fn warm_cache(
    store: &dyn OrderStore,
    cache: &OrderCache,
) -> Result<usize, StoreError> {
    let ids = store.list_all_ids().await?;
    let total = ids.len();

    let mut orders = Vec::with_capacity(total);
    for uid in &ids {
        orders.push(store.fetch(uid).await?);
    }
    cache.load_many(orders);

    tracing::info!(orders = total, cached = cache.len(), "cache warmed from store");
    Ok(total)
}
