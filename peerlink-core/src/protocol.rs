use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages a client sends to the relay.
///
/// Descriptions and candidates are opaque JSON: the relay forwards them
/// verbatim and only the transport engine on each end interprets them.
/// There is deliberately no room field on the relayed variants — routing is
/// derived from the connection's recorded membership, never from message
/// contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    JoinRoom { room: String, user_id: String },
    Offer { description: Value },
    Answer { description: Value },
    IceCandidate { candidate: Value },
    LeaveRoom,
}

/// Messages the relay sends to a client.
///
/// Relayed variants carry `from`: the sender's application-level user id,
/// stamped by the relay from its own session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    /// Sent to a joiner only: user ids of the members already in the room,
    /// in join order. Non-empty means the joiner initiates the offer.
    ParticipantsList { users: Vec<String> },
    UserConnected { user_id: String },
    UserDisconnected { user_id: String },
    Offer { description: Value, from: String },
    Answer { description: Value, from: String },
    IceCandidate { candidate: Value, from: String },
}
