mod room;
mod room_registry;

pub(crate) use room::Room;
pub use room_registry::RoomRegistry;
