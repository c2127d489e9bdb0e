//! Wire message types for the Tandem chat protocol.
//!
//! Everything that crosses a client connection is JSON. Two shapes exist:
//!
//! - [`ChatMessage`]: a frame sent by a client, relayed to its current peer.
//! - [`Notice`]: a status frame sent by the server (connect acknowledgment,
//!   match notification, peer-disconnect notification).
//!
//! The server treats `content` as opaque; the only well-formedness rule is
//! that a chat message carries a non-empty `type`.

mod message;
mod notice;

pub use message::{ChatMessage, WireError};
pub use notice::Notice;
