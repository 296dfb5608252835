pub mod health;
pub mod orders;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                          viewer WebSocket (update / reset signals)
///
/// /orders/preparing            preparing orders, oldest first
/// /orders/ready                ready orders, most recent first
/// /orders/ready/latest         most recently ready order
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/orders", orders::router())
}
