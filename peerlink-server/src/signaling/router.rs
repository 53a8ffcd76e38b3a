use crate::RelayError;
use crate::registry::RoomRegistry;
use crate::signaling::ConnectionSession;
use dashmap::DashMap;
use peerlink_core::{ClientMessage, PeerId, ServerMessage};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Routes signaling messages between a connection and the other members
/// of its room.
///
/// The router owns an outbox table mapping live connections to their
/// forwarding channels. Fanout is fire-and-forget per recipient: a dead
/// or slow recipient only logs, it never blocks the sender or the other
/// recipients. Per-sender ordering is preserved because each connection
/// dispatches from a single receive loop into per-recipient FIFO
/// channels.
#[derive(Clone)]
pub struct SignalingRouter {
    registry: RoomRegistry,
    outboxes: Arc<DashMap<PeerId, mpsc::UnboundedSender<ServerMessage>>>,
}

impl SignalingRouter {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry,
            outboxes: Arc::new(DashMap::new()),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Register a connection's outbox. Called once per accepted
    /// connection, before any message is dispatched for it.
    pub fn register(&self, peer: PeerId, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.outboxes.insert(peer, tx);
    }

    pub fn unregister(&self, peer: PeerId) {
        self.outboxes.remove(&peer);
    }

    /// Dispatch one parsed inbound message for a connection.
    pub fn dispatch(&self, session: &mut ConnectionSession, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinRoom { room, user_id } => self.on_join(session, &room, &user_id),
            ClientMessage::Offer { description } => self.on_offer(session, description),
            ClientMessage::Answer { description } => self.on_answer(session, description),
            ClientMessage::IceCandidate { candidate } => self.on_candidate(session, candidate),
            ClientMessage::LeaveRoom => self.on_leave(session),
        }
    }

    /// Handle a join: leave any previous room first, register under the
    /// normalized identifier, tell the others, and reply to the joiner
    /// alone with the pre-join member snapshot.
    pub fn on_join(&self, session: &mut ConnectionSession, raw_room: &str, user_id: &str) {
        if session.room().is_some() {
            // Explicit transition: a re-join always leaves the old room.
            self.on_leave(session);
        }

        let Some(room) = self.registry.get_or_create(raw_room) else {
            warn!(peer = %session.peer(), raw = raw_room, "join rejected: blank room identifier");
            return;
        };

        let others = self
            .registry
            .add_participant(&room, session.peer(), user_id);
        session.enter(room.clone(), user_id.to_string());

        info!(room = %room, peer = %session.peer(), user = user_id, "user joined room");

        self.broadcast_to_others(
            session,
            ServerMessage::UserConnected {
                user_id: user_id.to_string(),
            },
        );
        self.deliver(
            session.peer(),
            ServerMessage::ParticipantsList { users: others },
        );
    }

    pub fn on_offer(&self, session: &ConnectionSession, description: Value) {
        self.relay(session, "offer", |from| ServerMessage::Offer {
            description,
            from,
        });
    }

    pub fn on_answer(&self, session: &ConnectionSession, description: Value) {
        self.relay(session, "answer", |from| ServerMessage::Answer {
            description,
            from,
        });
    }

    pub fn on_candidate(&self, session: &ConnectionSession, candidate: Value) {
        self.relay(session, "ice-candidate", |from| ServerMessage::IceCandidate {
            candidate,
            from,
        });
    }

    /// Remove the connection from its room and tell the remaining
    /// members. Safe to call for a connection that never joined.
    pub fn on_leave(&self, session: &mut ConnectionSession) {
        let Some(membership) = session.clear() else {
            return;
        };

        // Collect recipients after removal so the leaver is excluded and
        // an already-deleted room yields no fanout.
        let remaining = self
            .registry
            .remove_participant(&membership.room, session.peer());
        info!(
            room = %membership.room,
            user = membership.user_id,
            remaining,
            "user left room"
        );

        for peer in self.registry.other_peers(&membership.room, session.peer()) {
            if let Err(e) = self.send(
                peer,
                ServerMessage::UserDisconnected {
                    user_id: membership.user_id.clone(),
                },
            ) {
                debug!(%peer, error = %e, "skipping unreachable member");
            }
        }
    }

    /// Abrupt disconnect: same observable side effects as a leave. The
    /// outbox is dropped separately by the connection handler.
    pub fn on_disconnect(&self, session: &mut ConnectionSession) {
        self.on_leave(session);
    }

    /// Relay an opaque payload to every other member of the sender's
    /// recorded room. A connection with no room is a logged no-op —
    /// the message names no room, and the recorded membership is the
    /// only routing source.
    fn relay<F>(&self, session: &ConnectionSession, kind: &str, make: F)
    where
        F: FnOnce(String) -> ServerMessage,
    {
        let Some(membership) = session.membership() else {
            warn!(peer = %session.peer(), kind, "dropping signal from connection outside any room");
            return;
        };

        let msg = make(membership.user_id.clone());
        for peer in self.registry.other_peers(&membership.room, session.peer()) {
            if let Err(e) = self.send(peer, msg.clone()) {
                debug!(%peer, error = %e, "skipping unreachable member");
            }
        }
    }

    fn broadcast_to_others(&self, session: &ConnectionSession, msg: ServerMessage) {
        let Some(membership) = session.membership() else {
            return;
        };
        for peer in self.registry.other_peers(&membership.room, session.peer()) {
            if let Err(e) = self.send(peer, msg.clone()) {
                debug!(%peer, error = %e, "skipping unreachable member");
            }
        }
    }

    fn deliver(&self, peer: PeerId, msg: ServerMessage) {
        if let Err(e) = self.send(peer, msg) {
            warn!(%peer, error = %e, "failed to deliver reply");
        }
    }

    fn send(&self, peer: PeerId, msg: ServerMessage) -> Result<(), RelayError> {
        let Some(outbox) = self.outboxes.get(&peer) else {
            return Err(RelayError::UnknownPeer(peer));
        };
        outbox
            .send(msg)
            .map_err(|_| RelayError::OutboxClosed(peer))
    }
}
