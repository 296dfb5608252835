//! WebSocket infrastructure for viewer screens.
//!
//! Provides the viewer registry, heartbeat monitoring, and the HTTP upgrade
//! handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::{run_heartbeat, HEARTBEAT_PERIOD};
pub use manager::{BroadcastReport, DeliveryError, WsManager};
