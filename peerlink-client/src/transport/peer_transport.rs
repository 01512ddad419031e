use crate::error::TransportError;
use crate::media::{LocalTrack, TrackKind};
use async_trait::async_trait;
use peerlink_core::{IceCandidate, SessionDescription};

/// The peer connection as seen by the coordinator.
///
/// Implementations report asynchronous happenings (negotiation needed, local
/// candidates, remote tracks, connection state) on the `TransportEvent`
/// channel they were built with.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    /// Must be called after the remote offer has been applied.
    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError>;

    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), TransportError>;

    /// Discards a local offer that has not been answered.
    async fn rollback(&self) -> Result<(), TransportError>;

    /// Creates a new outgoing sender for the track's kind.
    async fn add_track(&self, track: &LocalTrack) -> Result<(), TransportError>;

    /// Swaps the track on the existing sender of `kind` without renegotiating.
    async fn replace_track(&self, kind: TrackKind, track: &LocalTrack)
    -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}
