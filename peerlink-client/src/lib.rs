mod engine;
mod error;
mod sequencer;
mod status;

pub use engine::{
    ConnectivityState, LocalMedia, MediaTrack, SessionConfig, SessionEvent, TrackKind,
    TransportEngine, TransportSession,
};
pub use error::EngineError;
pub use sequencer::{NegotiationSequencer, NegotiationState, Role, SequencerConfig};
pub use status::{CallStatus, StatusSink};
