mod peer;
mod room;

pub use peer::PeerId;
pub use room::{RoomId, generate_room_code};
