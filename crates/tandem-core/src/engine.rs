//! Lifecycle controller and matchmaker.
//!
//! The [`Engine`] owns the registry and waiting pool behind a single mutex
//! (the matchmaking lock) and orchestrates the full session lifecycle:
//! connect → enqueue → match → relay → disconnect → requeue-peer. One clone
//! of the engine handle lives in every per-client transport task.
//!
//! ## Locking
//!
//! Every mutation runs under the matchmaking lock, and critical sections
//! only touch in-memory structures: deliveries use non-blocking
//! `try_send` on per-client channels, so the lock is never held across
//! network I/O. Performing the sends under the lock also keeps per-client
//! frame order deterministic (a client always sees its connect
//! acknowledgment before a match notice).
//!
//! ## Relay-failure policy
//!
//! A failed delivery to a peer does not terminate the sender's session.
//! The frame is dropped and the peer's own transport tasks observe the
//! broken connection and run the peer's teardown.

use std::sync::Arc;

use parking_lot::Mutex;
use tandem_proto::{ChatMessage, Notice};
use tokio::sync::mpsc;

use crate::error::EngineError;
use crate::registry::{ClientId, Outbound, Registry};

/// Read-only view of one client for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInfo {
    /// The client's identity.
    pub id: ClientId,
    /// Its current peer, if paired.
    pub peer: Option<ClientId>,
}

/// Point-in-time view of the registry and waiting pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// All registered clients, ordered by identity.
    pub clients: Vec<ClientInfo>,
    /// The waiting pool in FIFO order.
    pub waiting: Vec<ClientId>,
}

/// Shared matchmaking engine handle.
///
/// Cheap to clone; all clones operate on the same registry.
#[derive(Debug, Clone)]
pub struct Engine {
    inner: Arc<Mutex<State>>,
}

#[derive(Debug)]
struct State {
    registry: Registry,
    next_id: u64,
}

impl Engine {
    /// Create an engine with an empty registry.
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(State { registry: Registry::new(), next_id: 1 })) }
    }

    /// Register a new client and queue it for matching.
    ///
    /// Assigns a fresh identity, sends the connect acknowledgment down
    /// `outbound`, appends the client to the waiting pool tail and runs a
    /// matching pass. Returns the assigned identity.
    pub fn connect(&self, outbound: mpsc::Sender<Outbound>) -> Result<ClientId, EngineError> {
        let mut state = self.inner.lock();
        let id = state.allocate_id();
        state.registry.register(id, outbound)?;
        state.send_to(id, Outbound::Notice(Notice::Connected { user_id: id.to_string() }));
        state.registry.enqueue(id)?;
        tracing::info!(client = %id, "connected and queued for matching");
        state.match_waiting();
        Ok(id)
    }

    /// Pair waiting clients two at a time, FIFO, until fewer than two wait.
    ///
    /// Runs automatically after every connect and requeue; exposed for
    /// callers that want an explicit pass.
    pub fn try_match(&self) {
        self.inner.lock().match_waiting();
    }

    /// Forward a message from `from` to its current peer.
    ///
    /// Returns `false` when the client has no peer; messages sent while
    /// unpaired are dropped by design.
    pub fn relay(&self, from: ClientId, message: ChatMessage) -> bool {
        let state = self.inner.lock();
        let Some(peer) = state.registry.peer_of(from) else {
            tracing::debug!(client = %from, "no peer to relay to; dropping message");
            return false;
        };
        tracing::debug!(from = %from, to = %peer, kind = %message.kind, "relaying message");
        state.send_to(peer, Outbound::Relay(message));
        true
    }

    /// Tear down a client session.
    ///
    /// Idempotent: a second invocation for the same identity is a no-op.
    /// If the client was paired, its peer is notified, unlinked and
    /// requeued at the waiting pool tail (a fresh wait), then a matching
    /// pass runs so the freed peer can be re-paired immediately. Dropping
    /// the client's record closes its delivery channel, which ends its
    /// writer task and closes the connection.
    pub fn disconnect(&self, id: ClientId) {
        let mut state = self.inner.lock();
        let Some(former_peer) = state.registry.unregister(id) else {
            return;
        };

        if let Some(peer) = former_peer {
            state.registry.clear_peer(peer);
            state.send_to(peer, Outbound::Notice(Notice::DisconnectedPeer { peer: id.to_string() }));
            tracing::info!(client = %id, peer = %peer, "disconnected from peer; peer requeued");
            if let Err(error) = state.registry.enqueue(peer) {
                // Unreachable: the peer was just unlinked under this lock.
                tracing::error!(peer = %peer, %error, "failed to requeue orphaned peer");
            }
        }

        state.registry.remove_from_waiting(id);
        tracing::info!(client = %id, "disconnected");
        state.match_waiting();
    }

    /// Point-in-time view of connected clients, pairings and the waiting
    /// pool, for debug introspection.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.lock();
        let mut clients: Vec<ClientInfo> = state
            .registry
            .client_ids()
            .map(|id| ClientInfo { id, peer: state.registry.peer_of(id) })
            .collect();
        clients.sort_by_key(|info| info.id);
        Snapshot { clients, waiting: state.registry.waiting_ids().collect() }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Allocate a fresh identity from the monotonic counter.
    ///
    /// The loop keeps the retry-on-collision contract, though a collision
    /// cannot occur before the counter wraps.
    fn allocate_id(&mut self) -> ClientId {
        loop {
            let id = ClientId::new(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.registry.contains(id) {
                return id;
            }
        }
    }

    /// Drain the waiting pool two clients at a time, linking each pair
    /// before the matchmaking lock is released.
    ///
    /// Match notices are best-effort: a failed delivery does not roll back
    /// the pairing.
    fn match_waiting(&mut self) {
        while let Some((first, second)) = self.registry.dequeue_pair() {
            self.registry.link_peers(first, second);
            tracing::info!(first = %first, second = %second, "matched");
            self.send_to(
                first,
                Outbound::Notice(Notice::Matched {
                    user_id: first.to_string(),
                    peer: second.to_string(),
                }),
            );
            self.send_to(
                second,
                Outbound::Notice(Notice::Matched {
                    user_id: second.to_string(),
                    peer: first.to_string(),
                }),
            );
        }
    }

    /// Push a frame to one client's delivery channel, best-effort.
    fn send_to(&self, id: ClientId, frame: Outbound) {
        if let Some(outbound) = self.registry.outbound(id) {
            if outbound.try_send(frame).is_err() {
                tracing::warn!(client = %id, "outbound channel unavailable; dropping frame");
            }
        }
    }
}
