//! Matchmaking and session-lifecycle engine for Tandem.
//!
//! Pairs anonymous clients into two-party chat sessions and relays messages
//! between paired peers. The transport layer is an external collaborator:
//! it hands the engine one outbound channel per client and drives the
//! engine's operations from each client's read loop.
//!
//! ## Architecture
//!
//! ```text
//! tandem-core
//!   ├─ Registry      (client records + FIFO waiting pool)
//!   ├─ Engine        (lifecycle controller + matchmaker)
//!   └─ Outbound      (frames pushed to per-client delivery channels)
//! ```
//!
//! All registry, waiting-pool and peer-link mutations happen under a single
//! mutex (the matchmaking lock). Deliveries go through non-blocking channel
//! sends, so the lock is never held across network I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod registry;

pub use engine::{ClientInfo, Engine, Snapshot};
pub use error::EngineError;
pub use registry::{ClientId, Outbound, Registry};
