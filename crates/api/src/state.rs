use std::sync::Arc;

use orderboard_core::store::RecordStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used for health checks.
    pub pool: orderboard_db::DbPool,
    /// Read-only order store backing the fetch endpoints.
    pub store: Arc<dyn RecordStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registry of connected viewer screens.
    pub ws_manager: Arc<WsManager>,
}
