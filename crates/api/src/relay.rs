//! Bus-to-viewer relay.
//!
//! [`ViewerRelay`] subscribes to the board event bus and pushes every event
//! to all connected viewers through the [`WsManager`].

use std::sync::Arc;

use axum::extract::ws::Message;
use orderboard_events::{BoardEvent, Signal};
use tokio::sync::broadcast;

use crate::ws::{BroadcastReport, WsManager};

/// Forwards board events to viewer connections.
pub struct ViewerRelay {
    ws_manager: Arc<WsManager>,
}

impl ViewerRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](orderboard_events::EventBus) is dropped). If the relay
    /// falls behind, the missed events are unknown, so they are replaced by
    /// a `reset` followed by an `update`: viewers clear, then re-fetch the
    /// full state, which ends on the same screen whatever was missed.
    pub async fn run(self, mut receiver: broadcast::Receiver<BoardEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.forward(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Viewer relay lagged, sending reset and update");
                    self.forward(BoardEvent::Reset).await;
                    self.forward(BoardEvent::Update).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, viewer relay shutting down");
                    break;
                }
            }
        }
    }

    /// Push one event to every viewer.
    pub async fn forward(&self, event: BoardEvent) -> BroadcastReport {
        let text = match Signal::from(event).to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(event = event.name(), error = %e, "Failed to encode board event");
                return BroadcastReport::default();
            }
        };
        let report = self.ws_manager.broadcast(Message::Text(text.into())).await;

        if report.dropped > 0 || report.removed > 0 {
            tracing::warn!(
                event = event.name(),
                delivered = report.delivered,
                dropped = report.dropped,
                removed = report.removed,
                "Board event not delivered to every viewer"
            );
        } else {
            tracing::debug!(event = event.name(), viewers = report.delivered, "Board event relayed");
        }

        report
    }
}
