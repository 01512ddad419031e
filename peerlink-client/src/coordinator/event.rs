use crate::coordinator::CallState;
use crate::error::CoordinatorError;
use crate::transport::{PeerConnectionState, RemoteTrack};
use peerlink_core::{ChannelHandle, Identity, RoomName};

/// Notifications for the UI layer.
#[derive(Debug)]
pub enum CoordinatorEvent {
    StateChanged(CallState),

    /// The relay confirmed our join and told us our handle.
    JoinedRoom { room: RoomName, id: ChannelHandle },

    MemberJoined { identity: Identity, id: ChannelHandle },

    RemoteTrack(RemoteTrack),

    ConnectionState(PeerConnectionState),

    HandRaised { from: ChannelHandle, raised: bool },

    /// Both sides had an offer out. `yielded` is true when we rolled ours back.
    Glare { yielded: bool },

    NegotiationTimedOut,

    /// A frame that makes no sense in the current state. It was ignored.
    ProtocolAnomaly { event: &'static str, reason: String },

    /// Failure of work the coordinator started on its own, e.g. answering an
    /// incoming call.
    Error(CoordinatorError),
}
