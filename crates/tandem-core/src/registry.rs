//! Client registry and FIFO waiting pool.
//!
//! The registry is the single source of truth for "who is connected". Peer
//! links are stored as identity lookups rather than owning pointers, so a
//! matched pair never forms a reference cycle. Callers must hold the
//! engine's matchmaking lock for every mutation; the registry itself is a
//! plain data structure with no interior synchronization.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::Serialize;
use tandem_proto::{ChatMessage, Notice};
use tokio::sync::mpsc;

use crate::error::EngineError;

/// Identity of a connected client.
///
/// Allocated from a monotonic counter, displayed as `user_<n>` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user_{}", self.0)
    }
}

/// A frame queued for delivery to one client.
///
/// Serializes untagged: notices and relayed chat messages already carry
/// their own discriminating fields (`status` / `type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    /// A server status notice.
    Notice(Notice),
    /// A chat message relayed from the client's peer.
    Relay(ChatMessage),
}

/// Per-client record: the outbound delivery handle plus the peer link.
#[derive(Debug)]
struct ClientRecord {
    outbound: mpsc::Sender<Outbound>,
    peer: Option<ClientId>,
}

/// Client registry plus the FIFO waiting pool.
///
/// Invariants (upheld by the [`Engine`](crate::Engine), which performs every
/// mutation under one lock):
///
/// - a client is in the waiting pool iff it is registered and unpaired;
/// - peer links are symmetric and always name a registered client.
#[derive(Debug, Default)]
pub struct Registry {
    clients: HashMap<ClientId, ClientRecord>,
    waiting: VecDeque<ClientId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the identity is currently registered.
    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no clients are registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Add a new client record. The client starts unpaired and is NOT yet
    /// in the waiting pool; call [`Registry::enqueue`] to queue it.
    pub fn register(
        &mut self,
        id: ClientId,
        outbound: mpsc::Sender<Outbound>,
    ) -> Result<(), EngineError> {
        if self.clients.contains_key(&id) {
            return Err(EngineError::DuplicateIdentity { id });
        }
        self.clients.insert(id, ClientRecord { outbound, peer: None });
        Ok(())
    }

    /// Remove a client record, returning its former peer link.
    ///
    /// Idempotent: removing an absent identity is a no-op returning `None`.
    /// Dropping the record drops the outbound sender, which closes the
    /// client's delivery channel exactly once.
    pub fn unregister(&mut self, id: ClientId) -> Option<Option<ClientId>> {
        self.clients.remove(&id).map(|record| record.peer)
    }

    /// Append an unpaired client to the waiting pool tail.
    pub fn enqueue(&mut self, id: ClientId) -> Result<(), EngineError> {
        let record = self.clients.get(&id).ok_or(EngineError::UnknownClient { id })?;
        if record.peer.is_some() {
            return Err(EngineError::AlreadyPaired { id });
        }
        self.waiting.push_back(id);
        Ok(())
    }

    /// Atomically remove and return the two oldest waiting clients.
    ///
    /// Returns `None` when fewer than two clients wait. This is the sole
    /// extraction primitive the matchmaker uses; the caller links the pair
    /// before releasing the matchmaking lock.
    pub fn dequeue_pair(&mut self) -> Option<(ClientId, ClientId)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front()?;
        let second = self.waiting.pop_front()?;
        Some((first, second))
    }

    /// Remove an identity from anywhere in the waiting pool.
    ///
    /// No-op if absent. Covers clients that disconnect before being matched.
    pub fn remove_from_waiting(&mut self, id: ClientId) {
        self.waiting.retain(|waiting| *waiting != id);
    }

    /// Link two clients as peers of each other.
    pub(crate) fn link_peers(&mut self, a: ClientId, b: ClientId) {
        if let Some(record) = self.clients.get_mut(&a) {
            record.peer = Some(b);
        }
        if let Some(record) = self.clients.get_mut(&b) {
            record.peer = Some(a);
        }
    }

    /// Clear a client's peer link, returning the former peer.
    pub(crate) fn clear_peer(&mut self, id: ClientId) -> Option<ClientId> {
        self.clients.get_mut(&id).and_then(|record| record.peer.take())
    }

    /// Current peer of a client, if any.
    pub fn peer_of(&self, id: ClientId) -> Option<ClientId> {
        self.clients.get(&id).and_then(|record| record.peer)
    }

    /// Clone of a client's outbound delivery handle.
    pub(crate) fn outbound(&self, id: ClientId) -> Option<mpsc::Sender<Outbound>> {
        self.clients.get(&id).map(|record| record.outbound.clone())
    }

    /// Registered identities in unspecified order.
    pub(crate) fn client_ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.clients.keys().copied()
    }

    /// Waiting pool contents in FIFO order.
    pub(crate) fn waiting_ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.waiting.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> mpsc::Sender<Outbound> {
        mpsc::channel(8).0
    }

    #[test]
    fn register_rejects_duplicate_identity() {
        let mut registry = Registry::new();
        let id = ClientId::new(1);
        registry.register(id, handle()).unwrap();

        let result = registry.register(id, handle());
        assert!(matches!(result, Err(EngineError::DuplicateIdentity { .. })));
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut registry = Registry::new();
        let id = ClientId::new(1);
        registry.register(id, handle()).unwrap();

        assert!(registry.unregister(id).is_some());
        assert!(registry.unregister(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn enqueue_rejects_paired_client() {
        let mut registry = Registry::new();
        let a = ClientId::new(1);
        let b = ClientId::new(2);
        registry.register(a, handle()).unwrap();
        registry.register(b, handle()).unwrap();
        registry.link_peers(a, b);

        let result = registry.enqueue(a);
        assert!(matches!(result, Err(EngineError::AlreadyPaired { .. })));
    }

    #[test]
    fn enqueue_rejects_unknown_client() {
        let mut registry = Registry::new();
        let result = registry.enqueue(ClientId::new(42));
        assert!(matches!(result, Err(EngineError::UnknownClient { .. })));
    }

    #[test]
    fn dequeue_pair_returns_two_oldest() {
        let mut registry = Registry::new();
        let ids: Vec<ClientId> = (1..=3).map(ClientId::new).collect();
        for id in &ids {
            registry.register(*id, handle()).unwrap();
            registry.enqueue(*id).unwrap();
        }

        assert_eq!(registry.dequeue_pair(), Some((ids[0], ids[1])));
        // One client left: no pair available.
        assert_eq!(registry.dequeue_pair(), None);
        assert_eq!(registry.waiting_ids().collect::<Vec<_>>(), vec![ids[2]]);
    }

    #[test]
    fn dequeue_pair_requires_two_waiters() {
        let mut registry = Registry::new();
        assert_eq!(registry.dequeue_pair(), None);

        let id = ClientId::new(1);
        registry.register(id, handle()).unwrap();
        registry.enqueue(id).unwrap();
        assert_eq!(registry.dequeue_pair(), None);
    }

    #[test]
    fn remove_from_waiting_is_noop_when_absent() {
        let mut registry = Registry::new();
        let id = ClientId::new(1);
        registry.register(id, handle()).unwrap();
        registry.enqueue(id).unwrap();

        registry.remove_from_waiting(ClientId::new(99));
        assert_eq!(registry.waiting_ids().count(), 1);

        registry.remove_from_waiting(id);
        assert_eq!(registry.waiting_ids().count(), 0);
    }

    #[test]
    fn peer_links_are_symmetric() {
        let mut registry = Registry::new();
        let a = ClientId::new(1);
        let b = ClientId::new(2);
        registry.register(a, handle()).unwrap();
        registry.register(b, handle()).unwrap();

        registry.link_peers(a, b);
        assert_eq!(registry.peer_of(a), Some(b));
        assert_eq!(registry.peer_of(b), Some(a));

        assert_eq!(registry.clear_peer(a), Some(b));
        assert_eq!(registry.peer_of(a), None);
        // Clearing one side leaves the other to the caller; the engine
        // always clears or removes both under the same lock.
        assert_eq!(registry.peer_of(b), Some(a));
    }
}
