//! Order API Module
//!
//! Read-only lookups. Orders are immutable once ingested; all writes go
//! through the ingestion loop.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 订单查询：无需权限检查（基础操作）
    Router::new().route("/{id}", get(handler::get_by_id))
}
