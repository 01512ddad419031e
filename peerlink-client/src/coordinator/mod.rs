mod call_impl;
mod command;
mod event;
mod handle;
mod handle_signal_impl;
mod ice_impl;
mod media_impl;
mod negotiation_impl;
mod state;

pub use event::*;
pub use handle::*;
pub use state::*;

use crate::error::{CoordinatorError, MediaError};
use crate::media::{LocalTrack, MediaDevices, MediaStream, TrackKind};
use crate::signaling::SignalingOutput;
use crate::transport::{PeerConnectionState, PeerTransport, TransportEvent};
use command::{CoordinatorCommand, Reply};
use peerlink_core::{ChannelHandle, IceCandidate, Identity, SessionDescription};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

const COMMAND_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub identity: Identity,
    /// Attach local tracks as soon as our call is accepted.
    pub attach_on_accept: bool,
    /// Give up on an unanswered offer after this long. `None` waits forever.
    pub negotiation_timeout: Option<Duration>,
}

impl CoordinatorConfig {
    pub fn new(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            attach_on_accept: true,
            negotiation_timeout: None,
        }
    }
}

struct ScreenShare {
    screen: LocalTrack,
    previous_camera: Option<LocalTrack>,
}

/// Call work parked until local capture completes.
enum PendingCapture {
    Call {
        to: ChannelHandle,
        reply: Reply<()>,
    },
    /// `reply` is set when our own outgoing call turned into answering theirs.
    Answer {
        from: ChannelHandle,
        offer: SessionDescription,
        reply: Option<Reply<()>>,
    },
}

impl PendingCapture {
    fn role(&self) -> CallRole {
        match self {
            PendingCapture::Call { .. } => CallRole::Caller,
            PendingCapture::Answer { .. } => CallRole::Callee,
        }
    }
}

/// Drives one peer connection through call setup, renegotiation and media
/// changes.
///
/// Commands, relay frames and transport events are handled one at a time on
/// the task running [`Coordinator::run`], so no two transitions overlap.
pub struct Coordinator {
    config: CoordinatorConfig,
    transport: Box<dyn PeerTransport>,
    media: Arc<dyn MediaDevices>,
    signaling: Arc<dyn SignalingOutput>,
    command_tx: mpsc::WeakSender<CoordinatorCommand>,
    command_rx: mpsc::Receiver<CoordinatorCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_open: bool,
    events: mpsc::UnboundedSender<CoordinatorEvent>,

    state: CallState,
    local_handle: Option<ChannelHandle>,
    remote: Option<ChannelHandle>,
    remote_identity: Option<Identity>,
    local_stream: Option<MediaStream>,
    capture: Option<PendingCapture>,
    display_capture: Option<Reply<()>>,
    senders: HashMap<TrackKind, LocalTrack>,
    screen_share: Option<ScreenShare>,
    local_description: Option<SessionDescription>,
    /// What `local_description` was before our unanswered offer replaced it.
    description_before_offer: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    pending_candidates: VecDeque<IceCandidate>,
    renegotiation_in_flight: bool,
    renegotiation_pending: bool,
    deadline: Option<Instant>,
    rounds_completed: u32,
}

impl Coordinator {
    pub fn new(
        config: CoordinatorConfig,
        transport: Box<dyn PeerTransport>,
        transport_rx: mpsc::Receiver<TransportEvent>,
        media: Box<dyn MediaDevices>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> (
        Self,
        CoordinatorHandle,
        mpsc::UnboundedReceiver<CoordinatorEvent>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (events, events_rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            config,
            transport,
            media: Arc::from(media),
            signaling,
            command_tx: command_tx.downgrade(),
            command_rx,
            transport_rx,
            transport_open: true,
            events,
            state: CallState::Idle,
            local_handle: None,
            remote: None,
            remote_identity: None,
            local_stream: None,
            capture: None,
            display_capture: None,
            senders: HashMap::new(),
            screen_share: None,
            local_description: None,
            description_before_offer: None,
            remote_description: None,
            pending_candidates: VecDeque::new(),
            renegotiation_in_flight: false,
            renegotiation_pending: false,
            deadline: None,
            rounds_completed: 0,
        };

        (coordinator, CoordinatorHandle::new(command_tx), events_rx)
    }

    pub async fn run(mut self) {
        info!("Coordinator for {} started", self.config.identity);

        loop {
            let deadline = self.deadline;

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All coordinator handles dropped. Shutting down.");
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv(), if self.transport_open => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            debug!("Transport event channel closed");
                            self.transport_open = false;
                        }
                    }
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_timeout().await;
                }
            }
        }

        info!("Coordinator for {} finished", self.config.identity);
    }

    async fn handle_command(&mut self, cmd: CoordinatorCommand) {
        match cmd {
            CoordinatorCommand::JoinRoom { room, reply } => {
                let _ = reply.send(self.join_room(room).await);
            }
            CoordinatorCommand::Call { to, reply } => self.start_call(to, reply).await,
            CoordinatorCommand::AttachTracks { reply } => {
                let _ = reply.send(self.attach_tracks().await);
            }
            CoordinatorCommand::ToggleMute { reply } => {
                let _ = reply.send(self.toggle_mute());
            }
            CoordinatorCommand::ToggleCamera { reply } => {
                let _ = reply.send(self.toggle_camera());
            }
            CoordinatorCommand::StartScreenShare { reply } => self.start_screen_share(reply),
            CoordinatorCommand::StopScreenShare { reply } => {
                let _ = reply.send(self.stop_screen_share().await);
            }
            CoordinatorCommand::RaiseHand { raised, reply } => {
                let _ = reply.send(self.raise_hand(raised).await);
            }
            CoordinatorCommand::HangUp { reply } => {
                let _ = reply.send(self.hang_up().await);
            }
            CoordinatorCommand::Signal(msg) => self.handle_signal(msg).await,
            CoordinatorCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            CoordinatorCommand::MediaCaptured(result) => self.on_media_captured(result).await,
            CoordinatorCommand::DisplayCaptured(result) => self.on_display_captured(result).await,
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        if self.state == CallState::Terminated {
            debug!("Ignoring transport event after hang up: {:?}", event);
            return;
        }

        match event {
            TransportEvent::NegotiationNeeded => self.on_negotiation_needed().await,

            TransportEvent::LocalCandidate(candidate) => self.on_local_candidate(candidate).await,

            TransportEvent::RemoteTrack(track) => {
                info!("Remote {} track {} arrived", track.kind, track.id);
                self.emit(CoordinatorEvent::RemoteTrack(track));
            }

            TransportEvent::ConnectionState(state) => {
                self.emit(CoordinatorEvent::ConnectionState(state));
                if state == PeerConnectionState::Closed {
                    info!("Peer connection closed");
                    self.terminate();
                }
            }
        }
    }

    fn snapshot(&self) -> CoordinatorSnapshot {
        let senders = [TrackKind::Audio, TrackKind::Video]
            .into_iter()
            .filter_map(|kind| self.senders.get(&kind).map(|t| (kind, t.id().clone())))
            .collect();

        CoordinatorSnapshot {
            state: self.state,
            local_handle: self.local_handle,
            remote: self.remote,
            remote_identity: self.remote_identity.clone(),
            local_description: self.local_description.clone(),
            remote_description: self.remote_description.clone(),
            senders,
            renegotiation_in_flight: self.renegotiation_in_flight,
            renegotiation_pending: self.renegotiation_pending,
            screen_sharing: self.screen_share.is_some(),
            rounds_completed: self.rounds_completed,
        }
    }

    fn set_state(&mut self, state: CallState) {
        if self.state == state {
            return;
        }
        debug!("Call state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.emit(CoordinatorEvent::StateChanged(state));
    }

    fn terminate(&mut self) {
        self.deadline = None;
        self.renegotiation_in_flight = false;
        self.renegotiation_pending = false;
        self.pending_candidates.clear();

        if let Some(pending) = self.capture.take() {
            debug!("Dropping call work parked on local capture");
            match pending {
                PendingCapture::Call { reply, .. }
                | PendingCapture::Answer {
                    reply: Some(reply), ..
                } => {
                    let _ = reply.send(Err(CoordinatorError::Abandoned));
                }
                PendingCapture::Answer { reply: None, .. } => {}
            }
        }
        if let Some(reply) = self.display_capture.take() {
            let _ = reply.send(Err(CoordinatorError::Abandoned));
        }

        self.set_state(CallState::Terminated);
    }

    /// Runs a capture off the actor loop. The result comes back through the
    /// command queue, so commands and relay frames keep flowing while a
    /// permission prompt is open.
    fn spawn_capture<T, F>(
        &self,
        capture: F,
        into_command: fn(Result<T, MediaError>) -> CoordinatorCommand,
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T, MediaError>> + Send + 'static,
    {
        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = capture.await;
            match command_tx.upgrade() {
                Some(tx) => {
                    let _ = tx.send(into_command(result)).await;
                }
                None => debug!("Coordinator stopped before local capture finished"),
            }
        });
    }

    fn arm_deadline(&mut self) {
        self.deadline = self
            .config
            .negotiation_timeout
            .map(|timeout| Instant::now() + timeout);
    }

    fn ensure_active(&self) -> Result<(), CoordinatorError> {
        if self.state == CallState::Terminated {
            return Err(CoordinatorError::InvalidState { state: self.state });
        }
        Ok(())
    }

    fn protocol_anomaly(&self, event: &'static str, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Protocol anomaly on '{}': {}", event, reason);
        self.emit(CoordinatorEvent::ProtocolAnomaly { event, reason });
    }

    fn emit(&self, event: CoordinatorEvent) {
        let _ = self.events.send(event);
    }
}
