use peerlink_core::PeerId;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct Participant {
    pub peer: PeerId,
    pub user_id: String,
}

/// One rendezvous point. Participants are kept in join order so the
/// snapshot handed to a fresh joiner is deterministic.
#[derive(Debug)]
pub(crate) struct Room {
    created_at: Instant,
    participants: Vec<Participant>,
}

impl Room {
    pub fn new() -> Self {
        Self {
            created_at: Instant::now(),
            participants: Vec::new(),
        }
    }

    /// Add a participant and return the user ids of everyone who was
    /// already present. Idempotent by peer id.
    pub fn join(&mut self, peer: PeerId, user_id: &str) -> Vec<String> {
        let others = self.others_of(peer);
        if !self.contains(peer) {
            self.participants.push(Participant {
                peer,
                user_id: user_id.to_string(),
            });
        }
        others
    }

    /// Remove a participant. No-op when absent.
    pub fn remove(&mut self, peer: PeerId) {
        self.participants.retain(|p| p.peer != peer);
    }

    pub fn contains(&self, peer: PeerId) -> bool {
        self.participants.iter().any(|p| p.peer == peer)
    }

    pub fn others_of(&self, peer: PeerId) -> Vec<String> {
        self.participants
            .iter()
            .filter(|p| p.peer != peer)
            .map(|p| p.user_id.clone())
            .collect()
    }

    pub fn other_peers(&self, peer: PeerId) -> Vec<PeerId> {
        self.participants
            .iter()
            .filter(|p| p.peer != peer)
            .map(|p| p.peer)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn age(&self) -> tokio::time::Duration {
        self.created_at.elapsed()
    }
}
