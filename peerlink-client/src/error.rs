use thiserror::Error;

/// Failures reported by a transport-engine implementation.
///
/// These are sequencing errors: they are surfaced to the status observer
/// and never move the negotiation state machine to `Failed` on their own.
/// Only the engine's connectivity callback signals a connection failure.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Local capture device or permission failure. Not recoverable for
    /// the current attempt; requires explicit user action.
    #[error("media access failed: {0}")]
    MediaAccess(String),

    /// Creating or applying a description or candidate failed.
    #[error("negotiation operation failed: {0}")]
    Negotiation(String),

    /// The session was already closed.
    #[error("transport session closed")]
    SessionClosed,
}
