use crate::coordinator::Coordinator;
use peerlink_core::{ChannelHandle, ClientMessage, IceCandidate};
use tracing::{debug, warn};

impl Coordinator {
    pub(super) async fn on_local_candidate(&mut self, candidate: IceCandidate) {
        let Some(remote) = self.remote else {
            debug!("Dropping local ICE candidate: no remote participant");
            return;
        };

        if let Err(e) = self
            .signaling
            .send(ClientMessage::IceCandidate { to: remote, candidate })
            .await
        {
            warn!("Failed to send ICE candidate to {:?}: {}", remote, e);
        }
    }

    /// Candidates that arrive before the remote description are held back
    /// and applied in arrival order once it is set.
    pub(super) async fn on_remote_candidate(&mut self, from: ChannelHandle, candidate: IceCandidate) {
        if !self.is_from_remote(from, "peer:ice") {
            return;
        }

        if self.remote_description.is_none() {
            debug!("Buffering ICE candidate from {:?}", from);
            self.pending_candidates.push_back(candidate);
            return;
        }

        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate from {:?}: {}", from, e);
        }
    }

    pub(super) async fn flush_pending_candidates(&mut self) {
        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Failed to add buffered ICE candidate: {}", e);
            }
        }
    }
}
