/// Coarse user-visible call state. Never carries raw protocol payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Connecting,
    WaitingForPeer,
    PeerJoined,
    Connected,
    ConnectionLost,
    PeerLeft,
    CallEnded,
    Error(String),
}

/// Observer for status changes, implemented by the embedding UI.
pub trait StatusSink: Send + Sync {
    fn update(&self, status: CallStatus);
}
