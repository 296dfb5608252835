/// Errors raised by the viewer client.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The board returned a non-2xx status code.
    #[error("Board API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an established connection.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Writing to the terminal failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
