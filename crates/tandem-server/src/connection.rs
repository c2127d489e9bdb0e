//! Per-client WebSocket session handling.
//!
//! Each accepted connection gets two tasks: a relay (read) loop that feeds
//! inbound frames to the engine, and a writer task that drains the client's
//! outbound channel into the WebSocket sink. The engine owns the sending
//! half of the channel; when the engine unregisters the client the channel
//! closes, the writer drains and closes the socket, exactly once.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tandem_core::{ClientId, Engine, Outbound};
use tandem_proto::ChatMessage;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ServerError;

/// Outbound channel depth per client. A slow consumer that falls this far
/// behind starts losing frames (best-effort relay).
const OUTBOUND_BUFFER: usize = 64;

/// Drive one client session from handshake to teardown.
///
/// Returns after the relay loop exits and the client has been disconnected
/// from the engine. A handshake failure aborts before any engine state is
/// touched.
pub(crate) async fn serve_client(
    engine: Engine,
    stream: TcpStream,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    let websocket = tokio_tungstenite::accept_async(stream).await?;
    let (sink, stream) = websocket.split();

    let (outbound, rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);
    let id = engine.connect(outbound)?;
    tracing::debug!(client = %id, %addr, "websocket session established");

    let writer = tokio::spawn(write_outbound(id, sink, rx));

    read_inbound(&engine, id, stream).await;

    engine.disconnect(id);
    let _ = writer.await;
    Ok(())
}

/// Relay loop: consume inbound frames until the stream errors or closes.
///
/// Malformed frames are logged and skipped; they never end the session.
/// Messages sent while unpaired are dropped by the engine.
async fn read_inbound(
    engine: &Engine,
    id: ClientId,
    mut stream: SplitStream<WebSocketStream<TcpStream>>,
) {
    while let Some(next) = stream.next().await {
        let frame = match next {
            Ok(frame) => frame,
            Err(error) => {
                tracing::debug!(client = %id, %error, "read failed; closing session");
                break;
            },
        };

        let parsed = match &frame {
            Message::Text(text) => ChatMessage::parse(text.as_bytes()),
            Message::Binary(data) => ChatMessage::parse(data),
            Message::Close(_) => break,
            // Ping/pong are answered by the websocket layer.
            _ => continue,
        };

        match parsed {
            Ok(message) => {
                engine.relay(id, message);
            },
            Err(error) => {
                tracing::warn!(client = %id, %error, "malformed frame; dropping");
            },
        }
    }
}

/// Writer task: serialize outbound frames into the WebSocket sink.
///
/// Ends when the engine drops the sending half (teardown) or the sink
/// rejects a write (broken transport), then closes the socket.
async fn write_outbound(
    id: ClientId,
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut rx: mpsc::Receiver<Outbound>,
) {
    while let Some(frame) = rx.recv().await {
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(client = %id, %error, "failed to encode outbound frame");
                continue;
            },
        };
        if let Err(error) = sink.send(Message::text(text)).await {
            tracing::debug!(client = %id, %error, "write failed; closing session");
            break;
        }
    }
    let _ = sink.close().await;
}
