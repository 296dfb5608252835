//! Route definitions for the `/orders` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /preparing       -> list_preparing   (?limit=)
/// GET    /ready           -> list_ready       (?limit=)
/// GET    /ready/latest    -> latest_ready
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preparing", get(orders::list_preparing))
        .route("/ready", get(orders::list_ready))
        .route("/ready/latest", get(orders::latest_ready))
}
