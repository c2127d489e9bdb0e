//! Server status notices.

use serde::{Deserialize, Serialize};

/// A status frame sent by the server to a single client.
///
/// Serialized with a `status` discriminant, matching the wire shapes
/// `{"status":"connected",...}`, `{"status":"matched",...}` and
/// `{"status":"disconnected_peer",...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Notice {
    /// Acknowledges a new connection and reports the assigned identity.
    Connected {
        /// Identity assigned to the receiving client.
        #[serde(rename = "userID")]
        user_id: String,
    },

    /// Reports that the receiving client has been paired.
    Matched {
        /// Identity of the receiving client.
        #[serde(rename = "userID")]
        user_id: String,
        /// Identity of the newly assigned peer.
        peer: String,
    },

    /// Reports that the receiving client's peer disconnected and the
    /// receiver has been returned to the waiting pool.
    DisconnectedPeer {
        /// Identity of the peer that disconnected.
        peer: String,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn connected_wire_shape() {
        let notice = Notice::Connected { user_id: "user_1".to_owned() };
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value, json!({"status": "connected", "userID": "user_1"}));
    }

    #[test]
    fn matched_wire_shape() {
        let notice = Notice::Matched { user_id: "user_1".to_owned(), peer: "user_2".to_owned() };
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value, json!({"status": "matched", "userID": "user_1", "peer": "user_2"}));
    }

    #[test]
    fn disconnected_peer_wire_shape() {
        let notice = Notice::DisconnectedPeer { peer: "user_7".to_owned() };
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value, json!({"status": "disconnected_peer", "peer": "user_7"}));
    }

    #[test]
    fn notice_round_trips() {
        let notice = Notice::Matched { user_id: "user_9".to_owned(), peer: "user_10".to_owned() };
        let encoded = serde_json::to_string(&notice).unwrap();
        let decoded: Notice = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, notice);
    }
}
