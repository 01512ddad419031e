use crate::media::{TrackId, TrackKind};
use peerlink_core::{ChannelHandle, Identity, SessionDescription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRole {
    Caller,
    Callee,
}

/// Lifecycle of the single call a coordinator drives.
///
/// Renegotiation rounds run while `Connected`; whether one is outstanding is
/// tracked separately and visible in [`CoordinatorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    AwaitingLocalMedia(CallRole),
    Offering,
    Answering,
    Connected,
    Terminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSnapshot {
    pub state: CallState,
    pub local_handle: Option<ChannelHandle>,
    pub remote: Option<ChannelHandle>,
    pub remote_identity: Option<Identity>,
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
    /// One entry per outgoing sender, audio first.
    pub senders: Vec<(TrackKind, TrackId)>,
    pub renegotiation_in_flight: bool,
    pub renegotiation_pending: bool,
    pub screen_sharing: bool,
    pub rounds_completed: u32,
}

impl CoordinatorSnapshot {
    pub fn sender_count(&self, kind: TrackKind) -> usize {
        self.senders.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn sender_track(&self, kind: TrackKind) -> Option<&TrackId> {
        self.senders
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| id)
    }
}
