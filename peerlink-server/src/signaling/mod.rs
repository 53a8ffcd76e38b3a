mod router;
mod session;
mod ws_handler;

pub use router::SignalingRouter;
pub use session::ConnectionSession;
pub use ws_handler::ws_handler;
