//! Shared test fixtures and in-memory collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use shared::{Delivery, Item, Order, Payment};

use crate::store::{OrderStore, StoreError};

/// A structurally valid order with the given uid.
pub(crate) fn order(uid: &str) -> Order {
    Order {
        order_uid: uid.to_string(),
        track_number: format!("TRACK-{uid}"),
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name: "Test Testov".to_string(),
            phone: "+9720000000".to_string(),
            zip: "2639809".to_string(),
            city: "Kiryat Mozkin".to_string(),
            address: "Ploshad Mira 15".to_string(),
            region: "Kraiot".to_string(),
            email: "test@gmail.com".to_string(),
        },
        payment: Payment {
            transaction: uid.to_string(),
            request_id: String::new(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: 1817,
            payment_dt: 1637907727,
            bank: "alpha".to_string(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 0,
        },
        items: vec![Item {
            chrt_id: 9934930,
            track_number: format!("TRACK-{uid}"),
            price: 453,
            rid: format!("rid-{uid}"),
            name: "Mascaras".to_string(),
            sale: 30,
            size: "0".to_string(),
            total_price: 317,
            nm_id: 2389212,
            brand: "Vivienne Sabo".to_string(),
            status: 202,
        }],
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: "test".to_string(),
        delivery_service: "meest".to_string(),
        shardkey: "9".to_string(),
        sm_id: 99,
        date_created: Utc.with_ymd_and_hms(2021, 11, 26, 6, 22, 19).unwrap(),
        oof_shard: "1".to_string(),
    }
}

/// In-memory [`OrderStore`] with switchable failure injection and call
/// counters.
#[derive(Default)]
pub(crate) struct MemStore {
    orders: Mutex<HashMap<String, Order>>,
    pub fail_persist: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub persist_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl MemStore {
    pub fn with_orders<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        let store = Self::default();
        {
            let mut map = store.orders.lock();
            for order in orders {
                map.insert(order.order_uid.clone(), order);
            }
        }
        store
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.orders.lock().contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.orders.lock().len()
    }
}

#[async_trait]
impl OrderStore for MemStore {
    async fn persist(&self, order: &Order) -> Result<(), StoreError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store offline".to_string()));
        }
        // Idempotent upsert: an already stored uid is a no-op.
        self.orders
            .lock()
            .entry(order.order_uid.clone())
            .or_insert_with(|| order.clone());
        Ok(())
    }

    async fn fetch(&self, uid: &str) -> Result<Order, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store offline".to_string()));
        }
        self.orders
            .lock()
            .get(uid)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_all_ids(&self) -> Result<Vec<String>, StoreError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store offline".to_string()));
        }
        let mut ids: Vec<String> = self.orders.lock().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
