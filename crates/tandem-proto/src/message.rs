//! Client-originated chat messages.

use serde::{Deserialize, Serialize};

/// A chat message exchanged between paired clients.
///
/// The relay routes by the sender's current peer link, not by the `receiver`
/// field; `receiver` is carried verbatim for the client's benefit. All fields
/// default so that partial JSON still parses; well-formedness only requires a
/// non-empty `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message kind (e.g. `"text"`). Must be non-empty to be well-formed.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Opaque payload; the server never inspects it.
    #[serde(default)]
    pub content: String,
    /// Identity the sender claims; carried verbatim.
    #[serde(default)]
    pub sender: String,
    /// Intended recipient; ignored by routing.
    #[serde(default)]
    pub receiver: String,
}

/// Errors produced while decoding an inbound frame.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The frame was not valid JSON.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame parsed but its `type` field was empty or missing.
    #[error("message type is empty or missing")]
    MissingType,
}

impl ChatMessage {
    /// Decode an inbound frame and enforce the well-formedness rule.
    pub fn parse(bytes: &[u8]) -> Result<Self, WireError> {
        let message: Self = serde_json::from_slice(bytes)?;
        if message.kind.is_empty() {
            return Err(WireError::MissingType);
        }
        Ok(message)
    }
}
