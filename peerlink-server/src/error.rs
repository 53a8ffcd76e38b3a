use peerlink_core::PeerId;
use thiserror::Error;

/// Failures while delivering a signal to a connection.
///
/// Delivery is fire-and-forget per recipient; callers log these and move
/// on to the next recipient.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The peer has no registered outbox (already disconnected).
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// The peer's forwarding task has shut down.
    #[error("outbox closed for peer {0}")]
    OutboxClosed(PeerId),
}
