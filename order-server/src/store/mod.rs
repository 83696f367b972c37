//! Durable order store boundary
//!
//! The pipeline and the lookup path only see [`OrderStore`]: an idempotent
//! upsert, a fetch by uid, and an id enumeration for the bootstrap loader.
//! How orders are mapped onto tables is the Postgres implementation's
//! business ([`postgres::PgStore`]).

pub mod postgres;

use async_trait::async_trait;
use shared::Order;

pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Authoritative absence: no such order exists.
    #[error("order not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),

    /// The stored payload no longer decodes to an order. Persisted content
    /// is immutable, so this indicates corruption rather than drift.
    #[error("corrupt stored payload for order {uid}: {reason}")]
    Corrupt { uid: String, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Abstract durable store with transactional all-or-nothing semantics per
/// call. `persist` must be an idempotent upsert: re-persisting an already
/// stored uid is a no-op, never a partial overwrite.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn persist(&self, order: &Order) -> Result<(), StoreError>;

    /// Fetch the order with the given uid; `StoreError::NotFound` is the
    /// authoritative absence signal.
    async fn fetch(&self, uid: &str) -> Result<Order, StoreError>;

    /// Enumerate every stored order uid, for the bootstrap loader.
    async fn list_all_ids(&self) -> Result<Vec<String>, StoreError>;
}
