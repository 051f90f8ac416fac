//! Order API Handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::core::{Result, ServerError, ServerState};

/// Get order payload by id
///
/// 返回入库时的原始 JSON 字节，不做二次序列化。
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response> {
    if id.trim().is_empty() {
        return Err(ServerError::Validation("order id must not be empty".into()));
    }

    let payload = state.orders.get_order(&id).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        payload,
    )
        .into_response())
}
