use crate::coordinator::{CallState, Coordinator, CoordinatorEvent};
use crate::error::CoordinatorError;
use peerlink_core::{ChannelHandle, ClientMessage, SessionDescription};
use tracing::{debug, error, warn};

impl Coordinator {
    /// At most one renegotiation offer is outstanding. Triggers that arrive
    /// while one is out, or before the call is connected, collapse into a
    /// single pending round.
    pub(super) async fn on_negotiation_needed(&mut self) {
        if self.state != CallState::Connected || self.renegotiation_in_flight {
            debug!(
                "Deferring renegotiation (state {:?}, in flight: {})",
                self.state, self.renegotiation_in_flight
            );
            self.renegotiation_pending = true;
            return;
        }
        self.start_renegotiation().await;
    }

    pub(super) async fn run_pending_renegotiation(&mut self) {
        if self.renegotiation_pending
            && self.state == CallState::Connected
            && !self.renegotiation_in_flight
        {
            self.start_renegotiation().await;
        }
    }

    async fn start_renegotiation(&mut self) {
        let Some(remote) = self.remote else {
            warn!("Renegotiation needed but no remote participant is known");
            return;
        };
        self.renegotiation_pending = false;

        match self.send_renegotiation_offer(remote).await {
            Ok(()) => {
                debug!("Renegotiation offer sent to {:?}", remote);
                self.renegotiation_in_flight = true;
                self.arm_deadline();
            }
            Err(e) => {
                error!("Failed to start renegotiation with {:?}: {}", remote, e);
                self.emit(CoordinatorEvent::Error(e));
            }
        }
    }

    async fn send_renegotiation_offer(&mut self, to: ChannelHandle) -> Result<(), CoordinatorError> {
        let offer = self.set_local_offer().await?;

        if let Err(e) = self
            .signaling
            .send(ClientMessage::NegotiationNeeded { to, offer })
            .await
        {
            if let Err(rollback_err) = self.rollback_local_offer().await {
                warn!("Rollback after failed send also failed: {}", rollback_err);
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub(super) async fn on_renegotiation_offer(
        &mut self,
        from: ChannelHandle,
        offer: SessionDescription,
    ) {
        if !self.is_from_remote(from, "peer:nego:needed") {
            return;
        }
        if self.state != CallState::Connected {
            self.protocol_anomaly(
                "peer:nego:needed",
                format!("renegotiation offer while {:?}", self.state),
            );
            return;
        }
        if !offer.is_offer() {
            self.protocol_anomaly("peer:nego:needed", "payload is not an offer");
            return;
        }

        if self.renegotiation_in_flight {
            if !self.is_polite() {
                warn!("Glare with {:?}: keeping our offer, ignoring theirs", from);
                self.emit(CoordinatorEvent::Glare { yielded: false });
                return;
            }

            warn!("Glare with {:?}: rolling back our offer", from);
            if let Err(e) = self.rollback_local_offer().await {
                error!("Rollback failed during glare: {}", e);
                self.emit(CoordinatorEvent::Error(e.into()));
                return;
            }
            self.renegotiation_in_flight = false;
            self.renegotiation_pending = true;
            self.deadline = None;
            self.emit(CoordinatorEvent::Glare { yielded: true });
        }

        let answered = match self.answer_offer(offer).await {
            Ok(answer) => self
                .signaling
                .send(ClientMessage::NegotiationDone { to: from, answer })
                .await
                .map_err(CoordinatorError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = answered {
            error!("Failed to answer renegotiation from {:?}: {}", from, e);
            self.emit(CoordinatorEvent::Error(e));
        }

        self.run_pending_renegotiation().await;
    }

    pub(super) async fn on_renegotiation_answer(
        &mut self,
        from: ChannelHandle,
        answer: SessionDescription,
    ) {
        if !self.is_from_remote(from, "peer:nego:final") {
            return;
        }
        if !self.renegotiation_in_flight {
            self.protocol_anomaly("peer:nego:final", "no renegotiation offer is outstanding");
            return;
        }

        self.renegotiation_in_flight = false;
        self.deadline = None;
        self.description_before_offer = None;

        match self.apply_remote_description(answer).await {
            Ok(()) => {
                self.rounds_completed += 1;
                debug!("Renegotiation round {} complete", self.rounds_completed);
            }
            Err(e) => {
                error!("Failed to apply renegotiation answer: {}", e);
                self.emit(CoordinatorEvent::Error(e));
            }
        }

        self.run_pending_renegotiation().await;
    }

    pub(super) async fn handle_timeout(&mut self) {
        self.deadline = None;

        if self.state == CallState::Offering {
            warn!("Call offer was not answered in time");
            if let Err(e) = self.rollback_local_offer().await {
                warn!("Rollback after timeout failed: {}", e);
            }
            self.set_state(CallState::Idle);
            self.emit(CoordinatorEvent::NegotiationTimedOut);
        } else if self.renegotiation_in_flight {
            warn!("Renegotiation offer was not answered in time");
            if let Err(e) = self.rollback_local_offer().await {
                warn!("Rollback after timeout failed: {}", e);
            }
            self.renegotiation_in_flight = false;
            self.emit(CoordinatorEvent::NegotiationTimedOut);
            self.run_pending_renegotiation().await;
        }
    }

    /// The side with the smaller channel handle yields on glare. Without a
    /// known local handle we never yield.
    pub(super) fn is_polite(&self) -> bool {
        match (self.local_handle, self.remote) {
            (Some(local), Some(remote)) => local < remote,
            _ => false,
        }
    }
}
