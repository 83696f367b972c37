//! Order Server - stream-fed order store with a cached lookup path
//!
//! # Architecture overview
//!
//! The server consumes order records from a Kafka topic, persists them in
//! Postgres, and answers `GET /order/{id}` from a bounded in-memory cache
//! that falls back to the store on a miss.
//!
//! # Module structure
//!
//! ```text
//! order-server/src/
//! ├── core/      # Config, state, HTTP server, background tasks
//! ├── cache/     # Bounded TTL + LRU order cache
//! ├── stream/    # Stream source / dead-letter sink boundary (Kafka)
//! ├── ingest/    # Consumer loop and pipeline event reporting
//! ├── store/     # Durable order store (Postgres)
//! ├── query/     # Cache-aside lookup and startup cache warm-up
//! ├── routes/    # HTTP query surface
//! └── utils/     # Logging setup
//! ```

pub mod cache;
pub mod core;
pub mod ingest;
pub mod query;
pub mod routes;
pub mod store;
pub mod stream;
pub mod utils;

// Re-export public types
pub use crate::cache::OrderCache;
pub use crate::core::{AppState, Config, Server, ServerError};
pub use crate::ingest::IngestWorker;
pub use crate::query::OrderQuery;
pub use crate::store::OrderStore;
pub use crate::utils::logger::init_logger;

#[cfg(test)]
pub(crate) mod testutil;
