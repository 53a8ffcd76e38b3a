mod ice;
mod model;
mod protocol;

pub use ice::{DEFAULT_STUN_SERVERS, IceServerConfig};
pub use model::{PeerId, RoomId, generate_room_code};
pub use protocol::{ClientMessage, ServerMessage};
