use peerlink_core::{PeerId, RoomId};

/// A connection's room membership: the normalized room it sits in and the
/// user identity it joined with.
#[derive(Debug, Clone)]
pub(crate) struct Membership {
    pub room: RoomId,
    pub user_id: String,
}

/// Per-connection association state, owned by the connection's handler
/// task and passed explicitly into every router call.
///
/// This is the only place a connection's room and user identity live;
/// routing decisions never read either from message payloads, so a
/// connection cannot inject traffic into a room it never joined.
#[derive(Debug)]
pub struct ConnectionSession {
    peer: PeerId,
    membership: Option<Membership>,
}

impl ConnectionSession {
    pub fn new(peer: PeerId) -> Self {
        Self {
            peer,
            membership: None,
        }
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.membership.as_ref().map(|m| &m.room)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.membership.as_ref().map(|m| m.user_id.as_str())
    }

    pub(crate) fn membership(&self) -> Option<&Membership> {
        self.membership.as_ref()
    }

    pub(crate) fn enter(&mut self, room: RoomId, user_id: String) {
        self.membership = Some(Membership { room, user_id });
    }

    pub(crate) fn clear(&mut self) -> Option<Membership> {
        self.membership.take()
    }
}
