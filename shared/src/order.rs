//! Order wire model
//!
//! Mirrors the JSON envelope published on the order topic. Structural
//! validation lives on the types themselves so every consumer applies the
//! same rules: non-empty identifiers, at least one line item, nested
//! sub-records validated recursively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Delivery sub-record: recipient and destination address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Delivery {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    pub zip: String,
    #[validate(length(min = 1, message = "city must not be empty"))]
    pub city: String,
    #[validate(length(min = 1, message = "address must not be empty"))]
    pub address: String,
    pub region: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Payment sub-record. Monetary amounts are minor units on the wire;
/// they pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Payment {
    #[validate(length(min = 1, message = "transaction must not be empty"))]
    pub transaction: String,
    #[serde(default)]
    pub request_id: String,
    #[validate(length(min = 1, message = "currency must not be empty"))]
    pub currency: String,
    #[validate(length(min = 1, message = "provider must not be empty"))]
    pub provider: String,
    pub amount: i64,
    /// Payment timestamp, unix seconds.
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A single order line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Item {
    pub chrt_id: i64,
    #[validate(length(min = 1, message = "item track_number must not be empty"))]
    pub track_number: String,
    pub price: i64,
    #[validate(length(min = 1, message = "rid must not be empty"))]
    pub rid: String,
    #[validate(length(min = 1, message = "item name must not be empty"))]
    pub name: String,
    pub sale: i32,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i32,
}

/// The unit of work: one order as published on the stream.
///
/// `order_uid` is the globally unique identifier. Once an order has been
/// persisted its content is immutable; re-delivery of the same uid is an
/// idempotent upsert downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Order {
    #[validate(length(min = 1, message = "order_uid must not be empty"))]
    pub order_uid: String,
    #[validate(length(min = 1, message = "track_number must not be empty"))]
    pub track_number: String,
    #[validate(length(min = 1, message = "entry must not be empty"))]
    pub entry: String,
    #[validate(nested)]
    pub delivery: Delivery,
    #[validate(nested)]
    pub payment: Payment,
    #[validate(length(min = 1, message = "items must not be empty"), nested)]
    pub items: Vec<Item>,
    pub locale: String,
    #[serde(default)]
    pub internal_signature: String,
    #[validate(length(min = 1, message = "customer_id must not be empty"))]
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}
