use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use orderboard_core::types::Timestamp;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Default outbound queue size per viewer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::Sender<Message>;

/// Why a message did not reach one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The viewer's outbound queue is full; this message is dropped for it.
    #[error("viewer queue is full")]
    QueueFull,
    /// The viewer's connection task is gone; the viewer is deregistered.
    #[error("viewer disconnected")]
    Disconnected,
}

/// Outcome of a [`WsManager::broadcast`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
    pub removed: usize,
}

/// Metadata for a single viewer connection.
pub struct WsConnection {
    /// Bounded channel for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all connected viewers.
///
/// Every viewer has its own bounded queue, drained by that viewer's socket
/// task. Sending never waits: a slow viewer loses messages, a dead viewer is
/// removed, and neither affects the others or the caller.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
    queue_capacity: usize,
}

impl WsManager {
    /// Create an empty registry with the given per-viewer queue capacity.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let conn = WsConnection {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id = %conn_id, connected_secs, "Viewer deregistered");
        }
    }

    /// Queue a message for every connected viewer without waiting.
    pub async fn broadcast(&self, message: Message) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut disconnected = Vec::new();

        {
            let conns = self.connections.read().await;
            for (conn_id, conn) in conns.iter() {
                match deliver(conn, message.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(DeliveryError::QueueFull) => {
                        tracing::warn!(conn_id = %conn_id, "Viewer queue full, dropping message");
                        report.dropped += 1;
                    }
                    Err(DeliveryError::Disconnected) => disconnected.push(conn_id.clone()),
                }
            }
        }

        if !disconnected.is_empty() {
            let mut conns = self.connections.write().await;
            for conn_id in &disconnected {
                conns.remove(conn_id);
                tracing::debug!(conn_id = %conn_id, "Removed disconnected viewer");
            }
            report.removed = disconnected.len();
        }

        report
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all viewers before the
    /// server exits.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = deliver(conn, Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all viewer connections");
    }

    /// Send a Ping frame to every connected viewer.
    ///
    /// Used by the heartbeat task to keep connections alive and prune dead
    /// ones.
    pub async fn ping_all(&self) -> BroadcastReport {
        self.broadcast(Message::Ping(Bytes::new())).await
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

fn deliver(conn: &WsConnection, message: Message) -> Result<(), DeliveryError> {
    conn.sender.try_send(message).map_err(|e| match e {
        TrySendError::Full(_) => DeliveryError::QueueFull,
        TrySendError::Closed(_) => DeliveryError::Disconnected,
    })
}
