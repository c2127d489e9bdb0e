//! Tandem production server.
//!
//! Accepts WebSocket connections, registers each client with the
//! matchmaking engine and runs one relay loop per client.
//!
//! ## Architecture
//!
//! ```text
//! tandem-server
//!   ├─ Server        (TCP accept loop, one task per connection)
//!   ├─ connection    (WebSocket upgrade, relay loop, writer task)
//!   └─ tandem-core   (registry, waiting pool, matchmaker, lifecycle)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;

use std::net::SocketAddr;
use std::time::Duration;

pub use error::ServerError;
use tandem_core::Engine;
use tokio::net::TcpListener;

/// Interval for the periodic registry status log line.
const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g. "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:8080".to_owned() }
    }
}

/// Production Tandem server.
///
/// Wraps the matchmaking [`Engine`] with a WebSocket transport.
pub struct Server {
    engine: Engine,
    listener: TcpListener,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails. This is the only
    /// process-fatal condition; everything after bind is per-connection.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        Ok(Self { engine: Engine::new(), listener })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the matchmaking engine, for introspection.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run the server, accepting connections until shut down.
    ///
    /// Every accepted connection gets its own task; a failed session never
    /// takes down the accept loop.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.local_addr()?);

        let status_engine = self.engine.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(STATUS_LOG_INTERVAL);
            loop {
                tick.tick().await;
                let snapshot = status_engine.snapshot();
                tracing::debug!(
                    clients = snapshot.clients.len(),
                    waiting = snapshot.waiting.len(),
                    "registry status"
                );
            }
        });

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let engine = self.engine.clone();
                    tokio::spawn(async move {
                        if let Err(error) = connection::serve_client(engine, stream, addr).await {
                            tracing::debug!(%addr, %error, "session ended with error");
                        }
                    });
                },
                Err(error) => {
                    tracing::error!(%error, "accept failed");
                },
            }
        }
    }
}
