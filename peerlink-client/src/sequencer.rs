use crate::engine::{
    ConnectivityState, LocalMedia, MediaTrack, SessionConfig, SessionEvent, TransportEngine,
    TransportSession,
};
use crate::error::EngineError;
use crate::status::{CallStatus, StatusSink};
use peerlink_core::{ClientMessage, ServerMessage};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// Explicit negotiation phases. Illegal inputs for a phase (a candidate
/// with no session, an answer out of `OfferSent`) are reported and
/// ignored instead of crashing the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    OfferSent,
    OfferReceived,
    Answering,
    Stable,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub session: SessionConfig,
    /// Wait before the single reconnect attempt a connectivity failure
    /// schedules.
    pub reconnect_backoff: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            reconnect_backoff: Duration::from_secs(1),
        }
    }
}

enum Step {
    Signal(ServerMessage),
    InboxClosed,
    Session(SessionEvent),
    SessionClosed,
    Reconnect,
}

/// Drives the offer/answer/candidate exchange for one call.
///
/// All inputs — relayed signaling, session events, the reconnect timer —
/// are consumed by a single event loop, so state transitions never
/// interleave. Engine operation failures are reported to the status sink
/// and leave the state machine where it was; only the engine's
/// connectivity callback can move it to `Failed`.
pub struct NegotiationSequencer {
    engine: Arc<dyn TransportEngine>,
    media: Arc<dyn LocalMedia>,
    outbox: mpsc::UnboundedSender<ClientMessage>,
    status: Arc<dyn StatusSink>,
    config: SequencerConfig,

    state: NegotiationState,
    role: Option<Role>,
    session: Option<Arc<dyn TransportSession>>,
    session_events: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    /// Candidates that arrived before the remote description; applied in
    /// arrival order once it is set.
    pending_candidates: Vec<Value>,
    remote_description_set: bool,
    remote_track: Option<MediaTrack>,
    reconnect_at: Option<Instant>,
    in_room: bool,
    media_active: bool,
}

impl NegotiationSequencer {
    pub fn new(
        engine: Arc<dyn TransportEngine>,
        media: Arc<dyn LocalMedia>,
        outbox: mpsc::UnboundedSender<ClientMessage>,
        status: Arc<dyn StatusSink>,
        config: SequencerConfig,
    ) -> Self {
        Self {
            engine,
            media,
            outbox,
            status,
            config,
            state: NegotiationState::Idle,
            role: None,
            session: None,
            session_events: None,
            pending_candidates: Vec::new(),
            remote_description_set: false,
            remote_track: None,
            reconnect_at: None,
            in_room: false,
            media_active: false,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn remote_track(&self) -> Option<&MediaTrack> {
        self.remote_track.as_ref()
    }

    /// Announce this participant to the relay.
    pub fn join(&mut self, room: &str, user_id: &str) {
        self.send_signal(ClientMessage::JoinRoom {
            room: room.to_string(),
            user_id: user_id.to_string(),
        });
        self.in_room = true;
        self.media_active = true;
        self.status.update(CallStatus::Connecting);
    }

    /// Run until the signaling inbox closes, then tear everything down.
    pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<ServerMessage>) {
        loop {
            let deadline = self.reconnect_at;
            let step = tokio::select! {
                msg = inbox.recv() => msg.map(Step::Signal).unwrap_or(Step::InboxClosed),
                ev = next_event(&mut self.session_events) => {
                    ev.map(Step::Session).unwrap_or(Step::SessionClosed)
                }
                _ = sleep_until_opt(deadline), if deadline.is_some() => Step::Reconnect,
            };

            match step {
                Step::Signal(msg) => self.handle_signal(msg).await,
                Step::InboxClosed => break,
                Step::Session(event) => self.handle_session_event(event).await,
                Step::SessionClosed => self.session_events = None,
                Step::Reconnect => {
                    self.reconnect_at = None;
                    self.reconnect().await;
                }
            }
        }
        self.hang_up().await;
    }

    async fn handle_signal(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::ParticipantsList { users } => {
                if users.is_empty() {
                    self.status.update(CallStatus::WaitingForPeer);
                } else {
                    // somebody is already here: we initiate
                    self.status.update(CallStatus::Connecting);
                    self.start_as_initiator().await;
                }
            }
            ServerMessage::UserConnected { user_id } => {
                info!(user = user_id, "peer joined the room");
                self.status.update(CallStatus::PeerJoined);
            }
            ServerMessage::Offer { description, from } => {
                debug!(from, "received offer");
                self.handle_remote_offer(description).await;
            }
            ServerMessage::Answer { description, from } => {
                debug!(from, "received answer");
                self.handle_remote_answer(description).await;
            }
            ServerMessage::IceCandidate { candidate, .. } => {
                self.handle_remote_candidate(candidate).await;
            }
            ServerMessage::UserDisconnected { user_id } => {
                info!(user = user_id, "peer left the room");
                self.handle_peer_left().await;
            }
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LocalCandidate(candidate) => {
                // relayed as soon as discovered, independent of state
                self.send_signal(ClientMessage::IceCandidate { candidate });
            }
            SessionEvent::RemoteTrack(track) => {
                self.remote_track = Some(track);
                self.status.update(CallStatus::Connected);
            }
            SessionEvent::Connectivity(state) => self.handle_connectivity(state),
        }
    }

    fn handle_connectivity(&mut self, state: ConnectivityState) {
        match state {
            ConnectivityState::Connecting => self.status.update(CallStatus::Connecting),
            ConnectivityState::Connected => self.status.update(CallStatus::Connected),
            ConnectivityState::Disconnected => self.status.update(CallStatus::ConnectionLost),
            ConnectivityState::Failed => {
                warn!("transport connectivity failed");
                self.state = NegotiationState::Failed;
                self.status
                    .update(CallStatus::Error("connection failed, reconnecting".into()));
                self.schedule_reconnect();
            }
            ConnectivityState::Closed => {}
        }
    }

    async fn start_as_initiator(&mut self) {
        self.role = Some(Role::Initiator);
        if let Err(e) = self.initiate().await {
            self.report_error("creating offer", &e);
        }
    }

    async fn initiate(&mut self) -> Result<(), EngineError> {
        let session = self.ensure_session().await?;
        let offer = session.create_offer().await?;
        session.set_local_description(offer.clone()).await?;
        self.send_signal(ClientMessage::Offer { description: offer });
        self.state = NegotiationState::OfferSent;
        Ok(())
    }

    async fn handle_remote_offer(&mut self, description: Value) {
        self.role = Some(Role::Responder);
        self.state = NegotiationState::OfferReceived;
        if let Err(e) = self.answer(description).await {
            self.report_error("answering remote offer", &e);
        }
    }

    async fn answer(&mut self, description: Value) -> Result<(), EngineError> {
        let session = self.ensure_session().await?;
        session.set_remote_description(description).await?;
        self.remote_description_set = true;
        self.flush_pending_candidates(&session).await;
        self.state = NegotiationState::Answering;

        let answer = session.create_answer().await?;
        session.set_local_description(answer.clone()).await?;
        self.send_signal(ClientMessage::Answer {
            description: answer,
        });
        self.state = NegotiationState::Stable;
        Ok(())
    }

    async fn handle_remote_answer(&mut self, description: Value) {
        if self.state != NegotiationState::OfferSent {
            warn!(state = ?self.state, "unexpected answer, ignoring");
            return;
        }
        let Some(session) = self.session.clone() else {
            warn!("answer received with no active session");
            return;
        };
        match session.set_remote_description(description).await {
            Ok(()) => {
                self.remote_description_set = true;
                self.flush_pending_candidates(&session).await;
                self.state = NegotiationState::Stable;
            }
            Err(e) => self.report_error("applying remote answer", &e),
        }
    }

    async fn handle_remote_candidate(&mut self, candidate: Value) {
        let Some(session) = self.session.clone() else {
            warn!("candidate received before negotiation started, dropping");
            return;
        };
        if !self.remote_description_set {
            debug!("buffering candidate until the remote description is set");
            self.pending_candidates.push(candidate);
            return;
        }
        if let Err(e) = session.add_remote_candidate(candidate).await {
            warn!(error = %e, "failed to apply remote candidate");
        }
    }

    async fn flush_pending_candidates(&mut self, session: &Arc<dyn TransportSession>) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = session.add_remote_candidate(candidate).await {
                warn!(error = %e, "failed to apply buffered candidate");
            }
        }
    }

    async fn handle_peer_left(&mut self) {
        self.teardown_session().await;
        self.role = None;
        self.state = NegotiationState::Idle;
        self.status.update(CallStatus::PeerLeft);
    }

    fn schedule_reconnect(&mut self) {
        // one scheduled attempt per failure, never a retry storm
        if self.reconnect_at.is_some() {
            debug!("reconnect already scheduled");
            return;
        }
        self.reconnect_at = Some(Instant::now() + self.config.reconnect_backoff);
    }

    async fn reconnect(&mut self) {
        if !self.in_room || !self.media_active {
            info!("skipping reconnect: call already ended");
            return;
        }
        info!("reconnecting after connectivity failure");
        self.teardown_session().await;
        self.state = NegotiationState::Idle;
        self.start_as_initiator().await;
    }

    /// End the call. Idempotent from any state; every teardown step is
    /// independent and best-effort.
    pub async fn hang_up(&mut self) {
        if self.in_room {
            self.send_signal(ClientMessage::LeaveRoom);
            self.in_room = false;
        }
        self.reconnect_at = None;
        self.teardown_session().await;
        if self.media_active {
            self.media.stop();
            self.media_active = false;
            self.status.update(CallStatus::CallEnded);
        }
        self.role = None;
        self.state = NegotiationState::Idle;
    }

    async fn ensure_session(&mut self) -> Result<Arc<dyn TransportSession>, EngineError> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }
        let session = self.engine.create_session(&self.config.session).await?;
        for track in self.media.tracks() {
            session.add_local_track(track).await?;
        }
        self.session_events = session.take_events();
        self.pending_candidates.clear();
        self.remote_description_set = false;
        self.session = Some(session.clone());
        Ok(session)
    }

    async fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
        self.session_events = None;
        self.pending_candidates.clear();
        self.remote_description_set = false;
        self.remote_track = None;
    }

    fn send_signal(&self, msg: ClientMessage) {
        if self.outbox.send(msg).is_err() {
            warn!("signaling channel closed, dropping outbound message");
        }
    }

    fn report_error(&self, context: &str, error: &EngineError) {
        warn!(context, error = %error, "negotiation step failed");
        self.status
            .update(CallStatus::Error(format!("{context}: {error}")));
    }
}

async fn next_event(
    rx: &mut Option<mpsc::UnboundedReceiver<SessionEvent>>,
) -> Option<SessionEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
