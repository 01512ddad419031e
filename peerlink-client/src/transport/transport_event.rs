use crate::media::TrackKind;
use peerlink_core::IceCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    NegotiationNeeded,
    LocalCandidate(IceCandidate),
    RemoteTrack(RemoteTrack),
    ConnectionState(PeerConnectionState),
}
