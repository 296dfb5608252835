use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades a viewer connection to WebSocket.
///
/// Viewers only listen: they receive `{"event":"update"}` and
/// `{"event":"reset"}` text frames and fetch the lists over HTTP.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_viewer(socket, state.ws_manager))
}

/// Why a viewer socket stopped being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ended {
    /// The viewer closed the socket or the stream errored.
    ViewerLeft,
    /// The registry dropped this viewer's queue (shutdown or pruning).
    Deregistered,
    /// Writing a frame to the viewer failed.
    WriteFailed,
}

/// Serve one viewer on the current task.
///
/// Outbound frames come from the viewer's registry queue; inbound frames are
/// only watched for close and errors. A `Close` frame queued by the registry
/// is written and then ends the session.
async fn serve_viewer(mut socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut outbound = ws_manager.add(conn_id.clone()).await;
    tracing::info!(conn_id = %conn_id, "Viewer connected");

    let ended = loop {
        tokio::select! {
            queued = outbound.recv() => {
                let Some(frame) = queued else {
                    break Ended::Deregistered;
                };
                let closing = matches!(frame, Message::Close(_));
                if let Err(e) = socket.send(frame).await {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Viewer write failed");
                    break Ended::WriteFailed;
                }
                if closing {
                    break Ended::Deregistered;
                }
            }
            inbound = socket.recv() => match inbound {
                None | Some(Ok(Message::Close(_))) => break Ended::ViewerLeft,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Viewer pong");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Viewer read failed");
                    break Ended::ViewerLeft;
                }
            },
        }
    };

    ws_manager.remove(&conn_id).await;
    tracing::info!(conn_id = %conn_id, reason = ?ended, "Viewer disconnected");
}
