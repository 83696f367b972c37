//! Shared application state
//!
//! One `AppState` is built at startup and cloned into every HTTP handler
//! and background task. Cloning is shallow: everything behind it is `Arc`.

use std::sync::Arc;

use crate::cache::OrderCache;
use crate::core::Config;
use crate::query::OrderQuery;
use crate::store::OrderStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: Arc<OrderCache>,
    pub store: Arc<dyn OrderStore>,
    pub query: OrderQuery,
}

impl AppState {
    pub fn new(config: Config, cache: Arc<OrderCache>, store: Arc<dyn OrderStore>) -> Self {
        let query = OrderQuery::new(Arc::clone(&cache), Arc::clone(&store));
        Self {
            config,
            cache,
            store,
            query,
        }
    }
}
