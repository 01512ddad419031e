use crate::coordinator::command::{CoordinatorCommand, Reply};
use crate::coordinator::{CallRole, CallState, Coordinator, CoordinatorEvent, PendingCapture};
use crate::error::{CoordinatorError, MediaError, TransportError};
use crate::media::{MediaConstraints, MediaStream};
use peerlink_core::{ChannelHandle, ClientMessage, SessionDescription};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

impl Coordinator {
    /// The reply is held until our offer is out or the call fails.
    pub(super) async fn start_call(&mut self, to: Option<ChannelHandle>, reply: Reply<()>) {
        if self.state != CallState::Idle {
            let _ = reply.send(Err(CoordinatorError::InvalidState { state: self.state }));
            return;
        }
        let Some(remote) = to.or(self.remote) else {
            let _ = reply.send(Err(CoordinatorError::NoRemote));
            return;
        };
        self.set_remote(remote);

        info!("Calling {:?}", remote);
        self.await_local_media(PendingCapture::Call { to: remote, reply })
            .await;
    }

    pub(super) async fn on_incoming_call(&mut self, from: ChannelHandle, offer: SessionDescription) {
        if !offer.is_offer() {
            self.protocol_anomaly("incoming:call", "payload is not an offer");
            return;
        }

        match self.state {
            CallState::Idle => {}
            CallState::Offering if self.remote == Some(from) => {
                self.on_call_glare(from, offer).await;
                return;
            }
            CallState::AwaitingLocalMedia(CallRole::Caller) if self.remote == Some(from) => {
                // Nothing went out yet, so answering replaces our own offer.
                info!("{:?} called first, answering instead of offering", from);
                let reply = match self.capture.take() {
                    Some(PendingCapture::Call { reply, .. }) => Some(reply),
                    _ => None,
                };
                self.capture = Some(PendingCapture::Answer { from, offer, reply });
                self.set_state(CallState::AwaitingLocalMedia(CallRole::Callee));
                return;
            }
            state => {
                self.protocol_anomaly(
                    "incoming:call",
                    format!("call from {:?} while {:?}", from, state),
                );
                return;
            }
        }

        info!("Incoming call from {:?}", from);
        self.set_remote(from);
        self.await_local_media(PendingCapture::Answer {
            from,
            offer,
            reply: None,
        })
        .await;
    }

    /// Both sides offered the initial call. Same rule as renegotiation glare:
    /// the polite side drops its offer and answers, the other keeps waiting.
    async fn on_call_glare(&mut self, from: ChannelHandle, offer: SessionDescription) {
        if !self.is_polite() {
            warn!("Call glare with {:?}: keeping our offer, ignoring theirs", from);
            self.emit(CoordinatorEvent::Glare { yielded: false });
            return;
        }

        warn!("Call glare with {:?}: rolling back our offer", from);
        if let Err(e) = self.rollback_local_offer().await {
            error!("Rollback failed during call glare: {}", e);
            self.emit(CoordinatorEvent::Error(e.into()));
            return;
        }
        self.deadline = None;
        self.emit(CoordinatorEvent::Glare { yielded: true });

        if let Err(e) = self.accept_call(from, offer).await {
            self.emit(CoordinatorEvent::Error(e));
        }
    }

    pub(super) async fn on_call_accepted(&mut self, from: ChannelHandle, answer: SessionDescription) {
        if self.state != CallState::Offering {
            self.protocol_anomaly(
                "call:accepted",
                format!("answer from {:?} while {:?}", from, self.state),
            );
            return;
        }
        if !self.is_from_remote(from, "call:accepted") {
            return;
        }

        if let Err(e) = self.apply_remote_description(answer).await {
            error!("Failed to apply answer from {:?}: {}", from, e);
            self.emit(CoordinatorEvent::Error(e));
            return;
        }

        info!("Call accepted by {:?}", from);
        self.deadline = None;
        self.description_before_offer = None;
        self.set_state(CallState::Connected);

        if self.config.attach_on_accept && self.local_stream.is_some() {
            if let Err(e) = self.attach_tracks().await {
                error!("Failed to attach local tracks: {}", e);
                self.emit(CoordinatorEvent::Error(e));
            }
        }

        self.run_pending_renegotiation().await;
    }

    pub(super) async fn hang_up(&mut self) -> Result<(), CoordinatorError> {
        if self.state == CallState::Terminated {
            return Ok(());
        }

        info!("Hanging up");
        if let Err(e) = self.transport.close().await {
            warn!("Error while closing peer connection: {}", e);
        }
        self.terminate();
        Ok(())
    }

    /// Parks `pending` until camera and microphone are available. A stream
    /// captured for an earlier attempt is reused straight away.
    async fn await_local_media(&mut self, pending: PendingCapture) {
        self.set_state(CallState::AwaitingLocalMedia(pending.role()));
        self.capture = Some(pending);

        if let Some(stream) = self.local_stream.clone() {
            self.on_media_captured(Ok(stream)).await;
            return;
        }

        let media = Arc::clone(&self.media);
        self.spawn_capture(
            async move { media.get_user_media(MediaConstraints::default()).await },
            CoordinatorCommand::MediaCaptured,
        );
    }

    pub(super) async fn on_media_captured(&mut self, result: Result<MediaStream, MediaError>) {
        let Some(pending) = self.capture.take() else {
            debug!("Local media arrived after the call moved on, dropping it");
            return;
        };

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to capture local media: {}", e);
                self.set_state(CallState::Idle);
                match pending {
                    PendingCapture::Call { reply, .. }
                    | PendingCapture::Answer {
                        reply: Some(reply), ..
                    } => {
                        let _ = reply.send(Err(e.into()));
                    }
                    PendingCapture::Answer { reply: None, .. } => {
                        self.emit(CoordinatorEvent::Error(e.into()));
                    }
                }
                return;
            }
        };

        info!("Captured local stream {} ({} tracks)", stream.id(), stream.tracks().len());
        self.local_stream = Some(stream);

        match pending {
            PendingCapture::Call { to, reply } => {
                let _ = reply.send(self.offer_call(to).await);
            }
            PendingCapture::Answer { from, offer, reply } => {
                let result = self.accept_call(from, offer).await;
                match (reply, result) {
                    (Some(reply), result) => {
                        let _ = reply.send(result);
                    }
                    (None, Err(e)) => self.emit(CoordinatorEvent::Error(e)),
                    (None, Ok(())) => {}
                }
            }
        }
    }

    async fn offer_call(&mut self, to: ChannelHandle) -> Result<(), CoordinatorError> {
        if let Err(e) = self.send_call_offer(to).await {
            error!("Failed to offer call to {:?}: {}", to, e);
            self.set_state(CallState::Idle);
            return Err(e);
        }

        self.set_state(CallState::Offering);
        self.arm_deadline();
        Ok(())
    }

    async fn accept_call(
        &mut self,
        from: ChannelHandle,
        offer: SessionDescription,
    ) -> Result<(), CoordinatorError> {
        self.set_state(CallState::Answering);
        let answered = match self.answer_offer(offer).await {
            Ok(answer) => self
                .signaling
                .send(ClientMessage::CallAccepted { to: from, answer })
                .await
                .map_err(CoordinatorError::from),
            Err(e) => Err(e),
        };

        if let Err(e) = answered {
            error!("Failed to answer call from {:?}: {}", from, e);
            self.set_state(CallState::Idle);
            return Err(e);
        }

        self.set_state(CallState::Connected);
        self.run_pending_renegotiation().await;
        Ok(())
    }

    async fn send_call_offer(&mut self, to: ChannelHandle) -> Result<(), CoordinatorError> {
        let offer = self.set_local_offer().await?;

        if let Err(e) = self
            .signaling
            .send(ClientMessage::UserCall { to, offer })
            .await
        {
            if let Err(rollback_err) = self.rollback_local_offer().await {
                warn!("Rollback after failed send also failed: {}", rollback_err);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Creates an offer and makes it our local description, remembering the
    /// one it replaces.
    pub(super) async fn set_local_offer(&mut self) -> Result<SessionDescription, CoordinatorError> {
        let offer = self.transport.create_offer().await?;
        self.transport.set_local_description(offer.clone()).await?;
        self.description_before_offer = self.local_description.replace(offer.clone());
        Ok(offer)
    }

    /// Withdraws our unanswered offer on the transport and in our own
    /// bookkeeping.
    pub(super) async fn rollback_local_offer(&mut self) -> Result<(), TransportError> {
        self.transport.rollback().await?;
        self.local_description = self.description_before_offer.take();
        Ok(())
    }

    /// Applies a remote offer and produces the answer, leaving both
    /// descriptions set.
    pub(super) async fn answer_offer(
        &mut self,
        offer: SessionDescription,
    ) -> Result<SessionDescription, CoordinatorError> {
        self.apply_remote_description(offer).await?;
        let answer = self.transport.create_answer().await?;
        self.transport.set_local_description(answer.clone()).await?;
        self.local_description = Some(answer.clone());
        Ok(answer)
    }

    pub(super) async fn apply_remote_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), CoordinatorError> {
        self.transport.set_remote_description(desc.clone()).await?;
        self.remote_description = Some(desc);
        self.flush_pending_candidates().await;
        Ok(())
    }

    fn set_remote(&mut self, remote: ChannelHandle) {
        if self.remote != Some(remote) {
            self.remote_identity = None;
        }
        self.remote = Some(remote);
    }

    pub(super) fn is_from_remote(&self, from: ChannelHandle, event: &'static str) -> bool {
        if self.remote == Some(from) {
            return true;
        }
        self.protocol_anomaly(event, format!("{:?} is not the remote participant", from));
        false
    }
}
