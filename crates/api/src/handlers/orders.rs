//! Handlers for the viewer-facing `/orders` fetch surface.
//!
//! Viewers call these on connect and after every `update` signal; the
//! responses are the full current lists, never diffs.

use axum::extract::{Query, State};
use axum::Json;
use orderboard_core::order::OrderRecord;

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/orders/preparing
///
/// Orders in preparation, oldest first.
pub async fn list_preparing(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<OrderRecord>>>> {
    let limit = params.resolve(state.config.preparing_limit)?;
    let orders = state.store.fetch_preparing(limit).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/ready
///
/// Ready orders, most recently ready first.
pub async fn list_ready(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<OrderRecord>>>> {
    let limit = params.resolve(state.config.ready_limit)?;
    let orders = state.store.fetch_ready(limit).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/ready/latest
///
/// The most recently ready order, or `null`.
pub async fn latest_ready(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<OrderRecord>>>> {
    let order = state.store.fetch_latest_ready().await?;
    Ok(Json(DataResponse { data: order }))
}
