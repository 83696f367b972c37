//! Postgres implementation of [`OrderStore`]
//!
//! One authoritative `orders` table keyed by `order_uid` with the full order
//! snapshot as JSONB. Persisted content is immutable, so the upsert is
//! `ON CONFLICT DO NOTHING`: redelivered messages and reprocessing after a
//! failed commit land on the conflict path and change nothing.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;

use shared::Order;

use super::{OrderStore, StoreError};
use async_trait::async_trait;

/// Postgres-backed order store. `Clone` shares the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect, size the pool, and bring the schema up to date.
    ///
    /// Connection pooling and an acquire timeout are configured explicitly;
    /// hanging forever on an unavailable database would stall both the
    /// ingest worker and every lookup request.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {e}")))?;
        tracing::info!(max_connections, "database connected, migrations applied");

        Ok(Self { pool })
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn persist(&self, order: &Order) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (order_uid, payload, date_created)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_uid) DO NOTHING
            "#,
        )
        .bind(&order.order_uid)
        .bind(Json(order))
        .bind(order.date_created)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(order_uid = %order.order_uid, "order already persisted, upsert was a no-op");
        }
        Ok(())
    }

    async fn fetch(&self, uid: &str) -> Result<Order, StoreError> {
        let row: Option<(Json<Order>,)> =
            sqlx::query_as("SELECT payload FROM orders WHERE order_uid = $1")
                .bind(uid)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| match &e {
                    sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                        StoreError::Corrupt {
                            uid: uid.to_string(),
                            reason: e.to_string(),
                        }
                    }
                    _ => StoreError::from(e),
                })?;

        match row {
            Some((Json(order),)) => Ok(order),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_all_ids(&self) -> Result<Vec<String>, StoreError> {
        let ids = sqlx::query_scalar("SELECT order_uid FROM orders ORDER BY order_uid")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
