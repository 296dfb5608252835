//! WebSocket connection to the board's signal endpoint.

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::ViewerError;

/// A live signal connection.
pub type BoardSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection handle for one board server.
pub struct BoardClient {
    ws_url: String,
}

impl BoardClient {
    /// * `ws_url` - full signal URL, e.g. `ws://host:3001/api/v1/ws`.
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Open the signal WebSocket.
    pub async fn connect(&self) -> Result<BoardSocket, ViewerError> {
        let (socket, _response) = connect_async(self.ws_url.as_str()).await.map_err(|e| {
            ViewerError::Connection(format!("Failed to connect to {}: {e}", self.ws_url))
        })?;

        tracing::info!(url = %self.ws_url, "Connected to order board");
        Ok(socket)
    }
}
