//! HTTP query surface
//!
//! Two routes: the order lookup consumed by callers, and a health probe.
//! Write traffic never enters here; orders only arrive via the stream.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::Order;
use tower_http::trace::TraceLayer;

use crate::core::{AppState, Result, ServerError};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/order/{id}", get(get_order))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_order(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>> {
    if id.trim().is_empty() {
        return Err(ServerError::NotFound);
    }
    let order = state.query.get_by_id(&id).await?;
    Ok(Json(order))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
