//! Bounded in-memory order cache
//!
//! Maps `order_uid` to the latest order snapshot with two eviction rules:
//!
//! - **TTL**: an entry untouched for longer than the configured time-to-live
//!   is expired. Expiry is detected lazily on `get` and proactively by the
//!   periodic sweep, so memory stays bounded even for entries nobody reads.
//! - **LRU**: when a `put` pushes the cache over capacity, the entry least
//!   recently touched by `get` or `put` is evicted.
//!
//! All operations take copies in and hand copies out; no caller ever holds a
//! reference into the cache. A single mutex covers the map and the recency
//! order together — a hit must refresh recency atomically, and an eviction
//! must see a consistent view of both structures.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use shared::Order;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;


/// Construction-time rejection of degenerate capacity or TTL.
#[derive(Debug, thiserror::Error)]
#[error("cache capacity and ttl must be positive (capacity={capacity}, ttl={ttl:?})")]
pub struct InvalidCacheConfig {
    capacity: usize,
    ttl: Duration,
}

struct Entry {
    order: Order,
    /// Last time this entry was written or read.
    touched: Instant,
    /// Position in the recency order; larger = more recently touched.
    tick: u64,
}

/// Map plus recency index, mutated only under one lock.
///
/// Invariant: `recency` holds exactly one `tick -> uid` pair per entry, and
/// `entries[uid].tick` is that tick.
#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    recency: BTreeMap<u64, String>,
    tick: u64,
}

impl Inner {
    fn touch(&mut self, uid: &str, now: Instant) {
        self.tick += 1;
        let tick = self.tick;
        let Self {
            entries, recency, ..
        } = self;
        if let Some(entry) = entries.get_mut(uid) {
            recency.remove(&entry.tick);
            entry.tick = tick;
            entry.touched = now;
            recency.insert(tick, uid.to_string());
        }
    }

    fn remove(&mut self, uid: &str) -> Option<Entry> {
        let entry = self.entries.remove(uid)?;
        self.recency.remove(&entry.tick);
        Some(entry)
    }

    fn evict_lru(&mut self) {
        if let Some((_, uid)) = self.recency.pop_first() {
            self.entries.remove(&uid);
        }
    }
}

/// Bounded TTL + LRU cache over order snapshots.
///
/// Capacity and TTL are fixed at construction; there is no dynamic resize.
pub struct OrderCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl OrderCache {
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, InvalidCacheConfig> {
        if capacity == 0 || ttl.is_zero() {
            return Err(InvalidCacheConfig { capacity, ttl });
        }
        Ok(Self {
            inner: Mutex::new(Inner::default()),
            capacity,
            ttl,
        })
    }

    /// Look up an order by uid.
    ///
    /// A hit refreshes recency and the last-touched timestamp and returns a
    /// copy. An entry found expired is evicted as a side effect and reported
    /// as a miss.
    pub fn get(&self, uid: &str) -> Option<Order> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let expired = match inner.entries.get(uid) {
            None => return None,
            Some(entry) => now.duration_since(entry.touched) > self.ttl,
        };
        if expired {
            inner.remove(uid);
            return None;
        }
        inner.touch(uid, now);
        inner.entries.get(uid).map(|entry| entry.order.clone())
    }

    /// Insert or overwrite the entry for `order.order_uid`, refreshing
    /// recency and timestamp. Evicts the least-recently-used entry if the
    /// insert pushed the cache over capacity.
    pub fn put(&self, order: &Order) {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        if inner.entries.contains_key(&order.order_uid) {
            if let Some(entry) = inner.entries.get_mut(&order.order_uid) {
                entry.order = order.clone();
            }
            inner.touch(&order.order_uid, now);
            return;
        }
        inner.tick += 1;
        let tick = inner.tick;
        inner.recency.insert(tick, order.order_uid.clone());
        inner.entries.insert(
            order.order_uid.clone(),
            Entry {
                order: order.clone(),
                touched: now,
                tick,
            },
        );
        while inner.entries.len() > self.capacity {
            inner.evict_lru();
        }
    }

    /// Bulk `put` used by the bootstrap loader. Safe to call concurrently
    /// with `get`/`put`; each order is inserted under the same lock
    /// discipline as a single `put`.
    pub fn load_many<I>(&self, orders: I)
    where
        I: IntoIterator<Item = Order>,
    {
        for order in orders {
            self.put(&order);
        }
    }

    /// Explicitly drop an entry, if present.
    pub fn invalidate(&self, uid: &str) -> bool {
        self.inner.lock().remove(uid).is_some()
    }

    /// Evict every entry whose age since last touch exceeds the TTL.
    /// Returns the number of evicted entries.
    pub fn sweep(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.touched) > self.ttl)
            .map(|(uid, _)| uid.clone())
            .collect();
        for uid in &expired {
            inner.remove(uid);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodic sweep loop, run as a background task until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the loop only
        // sweeps at interval boundaries.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = self.sweep();
                    if evicted > 0 {
                        tracing::debug!(evicted, remaining = self.len(), "cache sweep evicted expired entries");
                    }
                }
            }
        }
        tracing::debug!("cache sweeper stopped");
    }
}
