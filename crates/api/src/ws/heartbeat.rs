use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Default time between viewer pings.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(30);

/// Ping every viewer each `period` until `cancel` fires.
///
/// Pings go through [`WsManager::ping_all`], so a viewer whose socket task
/// has gone is pruned here even when no board event is published for hours.
pub async fn run_heartbeat(ws_manager: Arc<WsManager>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; viewers were just registered.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let report = ws_manager.ping_all().await;
                if report.removed > 0 || report.dropped > 0 {
                    tracing::debug!(
                        pinged = report.delivered,
                        removed = report.removed,
                        dropped = report.dropped,
                        "Viewer heartbeat pruned connections"
                    );
                } else {
                    tracing::trace!(pinged = report.delivered, "Viewer heartbeat");
                }
            }
        }
    }

    tracing::debug!("Viewer heartbeat stopped");
}
