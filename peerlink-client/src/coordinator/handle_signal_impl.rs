use crate::coordinator::{CallState, Coordinator, CoordinatorEvent};
use peerlink_core::ServerMessage;
use tracing::{debug, info};

impl Coordinator {
    pub(super) async fn handle_signal(&mut self, msg: ServerMessage) {
        if self.state == CallState::Terminated {
            debug!("Ignoring '{}' after hang up", msg.event_name());
            return;
        }

        match msg {
            ServerMessage::RoomJoined { identity, room, id } => {
                info!("Joined room '{}' as {} on channel {:?}", room, identity, id);
                self.local_handle = Some(id);
                self.emit(CoordinatorEvent::JoinedRoom { room, id });
            }

            ServerMessage::UserJoined { identity, id } => {
                if Some(id) == self.local_handle {
                    return;
                }
                info!("{} joined on channel {:?}", identity, id);
                if self.state == CallState::Idle {
                    self.remote = Some(id);
                    self.remote_identity = Some(identity.clone());
                }
                self.emit(CoordinatorEvent::MemberJoined { identity, id });
            }

            ServerMessage::IncomingCall { from, offer } => self.on_incoming_call(from, offer).await,

            ServerMessage::CallAccepted { from, answer } => {
                self.on_call_accepted(from, answer).await
            }

            ServerMessage::NegotiationNeeded { from, offer } => {
                self.on_renegotiation_offer(from, offer).await
            }

            ServerMessage::NegotiationFinal { from, answer } => {
                self.on_renegotiation_answer(from, answer).await
            }

            ServerMessage::IceCandidate { from, candidate } => {
                self.on_remote_candidate(from, candidate).await
            }

            ServerMessage::HandRaised { from, is_raised } => {
                if self.is_from_remote(from, "hand:raised") {
                    self.emit(CoordinatorEvent::HandRaised {
                        from,
                        raised: is_raised,
                    });
                }
            }
        }
    }
}
