mod error;
mod http;
mod reaper;
mod registry;
mod signaling;

pub use error::RelayError;
pub use http::{health, room_lookup};
pub use reaper::IdleReaper;
pub use registry::RoomRegistry;
pub use signaling::{ConnectionSession, SignalingRouter, ws_handler};
