use crate::error::EngineError;
use async_trait::async_trait;
use peerlink_core::IceServerConfig;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Handle to one captured or received media track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a transport session pushes back to its owner. Delivered over a
/// single channel so the sequencer consumes them serialized with
/// signaling traffic.
#[derive(Debug)]
pub enum SessionEvent {
    /// A locally discovered connectivity candidate, ready to relay.
    LocalCandidate(Value),
    /// The remote side's media track arrived.
    RemoteTrack(MediaTrack),
    Connectivity(ConnectivityState),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ice_servers: IceServerConfig::stun_defaults(),
        }
    }
}

/// One peer-to-peer transport session. Descriptions and candidates are
/// opaque JSON documents owned by the engine; the sequencer only moves
/// them between the session and the signaling channel.
#[async_trait]
pub trait TransportSession: Send + Sync {
    async fn add_local_track(&self, track: MediaTrack) -> Result<(), EngineError>;
    async fn create_offer(&self) -> Result<Value, EngineError>;
    async fn create_answer(&self) -> Result<Value, EngineError>;
    async fn set_local_description(&self, description: Value) -> Result<(), EngineError>;
    async fn set_remote_description(&self, description: Value) -> Result<(), EngineError>;
    async fn add_remote_candidate(&self, candidate: Value) -> Result<(), EngineError>;
    async fn close(&self);

    /// Hand over the session's event stream. Yields `Some` exactly once.
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<SessionEvent>>;
}

/// Factory for transport sessions (the browser or native WebRTC stack).
#[async_trait]
pub trait TransportEngine: Send + Sync {
    async fn create_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Arc<dyn TransportSession>, EngineError>;
}

/// The local capture stream. Owned by the call for its whole lifetime:
/// tracks are reused across a reconnect and only released by `stop`,
/// which must be idempotent.
pub trait LocalMedia: Send + Sync {
    fn tracks(&self) -> Vec<MediaTrack>;
    fn stop(&self);
}
