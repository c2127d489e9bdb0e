//! Engine error types.

use thiserror::Error;

use crate::registry::ClientId;

/// Errors from registry and engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A client with this identity is already registered.
    #[error("duplicate identity: {id}")]
    DuplicateIdentity {
        /// The colliding identity.
        id: ClientId,
    },

    /// The client is paired and may not enter the waiting pool.
    ///
    /// This is a programming-contract violation, not a runtime condition:
    /// the engine only enqueues clients whose peer link is clear.
    #[error("client {id} is already paired")]
    AlreadyPaired {
        /// The paired client.
        id: ClientId,
    },

    /// The identity is not present in the registry.
    #[error("unknown client: {id}")]
    UnknownClient {
        /// The missing identity.
        id: ClientId,
    },
}
