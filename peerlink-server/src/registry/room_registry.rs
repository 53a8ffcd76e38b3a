use crate::registry::Room;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use peerlink_core::{PeerId, RoomId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// In-memory room table.
///
/// Every mutation for a given room runs inside a single dashmap entry
/// critical section, so concurrent join/leave cannot lose updates and the
/// stale sweep (which holds the shard lock through `retain`) cannot delete
/// a room that just gained a participant.
///
/// Empty-room policy: a room is deleted the moment its last participant
/// leaves. [`RoomRegistry::sweep_stale`] only catches rooms that were
/// created (by a lookup or an aborted join) and never occupied.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a raw identifier and make sure the room exists.
    ///
    /// Returns `None` only for identifiers that are blank after trimming.
    pub fn get_or_create(&self, raw: &str) -> Option<RoomId> {
        let room_id = RoomId::normalize(raw)?;
        if let Entry::Vacant(vacant) = self.rooms.entry(room_id.clone()) {
            info!(room = %room_id, "creating room");
            vacant.insert(Room::new());
        }
        Some(room_id)
    }

    /// Register a participant, creating the room if needed.
    ///
    /// Returns the join-ordered user ids of the members that were already
    /// present — the snapshot sent back to the joiner. The snapshot and
    /// the insertion happen in the same critical section. Idempotent by
    /// peer id.
    pub fn add_participant(&self, room_id: &RoomId, peer: PeerId, user_id: &str) -> Vec<String> {
        let mut room = self.rooms.entry(room_id.clone()).or_insert_with(Room::new);
        let others = room.join(peer, user_id);
        debug!(room = %room_id, %peer, count = room.len(), "participant joined");
        others
    }

    /// Remove a participant and return how many remain. Idempotent; the
    /// room is deleted immediately when it becomes empty.
    pub fn remove_participant(&self, room_id: &RoomId, peer: PeerId) -> usize {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().remove(peer);
                let remaining = occupied.get().len();
                if remaining == 0 {
                    occupied.remove();
                    info!(room = %room_id, "room deleted (empty)");
                }
                remaining
            }
            Entry::Vacant(_) => 0,
        }
    }

    /// User ids of everyone in the room except `peer`, in join order.
    pub fn list_others(&self, room_id: &RoomId, peer: PeerId) -> Vec<String> {
        self.rooms
            .get(room_id)
            .map(|room| room.others_of(peer))
            .unwrap_or_default()
    }

    /// Peer ids of everyone in the room except `peer` — the relay fanout
    /// targets.
    pub fn other_peers(&self, room_id: &RoomId, peer: PeerId) -> Vec<PeerId> {
        self.rooms
            .get(room_id)
            .map(|room| room.other_peers(peer))
            .unwrap_or_default()
    }

    pub fn participant_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map(|room| room.len()).unwrap_or(0)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Delete every empty room older than `stale_after`. Returns how many
    /// were removed.
    pub fn sweep_stale(&self, stale_after: Duration) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|room_id, room| {
            let stale = room.is_empty() && room.age() >= stale_after;
            if stale {
                info!(room = %room_id, "room reaped (stale)");
            }
            !stale
        });
        before - self.rooms.len()
    }
}
