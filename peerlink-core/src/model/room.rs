use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Normalized room identifier.
///
/// Room identifiers are case-insensitive and whitespace-trimmed, so
/// `"Room42 "` and `"room42"` name the same rendezvous point. The newtype
/// can only be built through [`RoomId::normalize`], which is the single
/// entry point for that folding.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Normalize a raw identifier. Returns `None` when nothing remains
    /// after trimming; an unnamed room is not joinable.
    pub fn normalize(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_lowercase();
        if folded.is_empty() {
            return None;
        }
        Some(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short shareable room code for the "create a call" flow.
pub fn generate_room_code() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_string()
}
