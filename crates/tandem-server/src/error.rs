//! Server error types.

use thiserror::Error;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket-level I/O failure (bind, accept, address lookup).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The WebSocket handshake with a client failed.
    ///
    /// Fatal only to that connection attempt; no client is registered.
    #[error("websocket handshake failed: {0}")]
    Handshake(#[from] tokio_tungstenite::tungstenite::Error),

    /// The matchmaking engine rejected an operation.
    #[error("engine error: {0}")]
    Engine(#[from] tandem_core::EngineError),
}
