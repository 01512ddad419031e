use crate::coordinator::CoordinatorSnapshot;
use crate::error::{CoordinatorError, MediaError};
use crate::media::{LocalTrack, MediaStream};
use peerlink_core::{ChannelHandle, RoomName, ServerMessage};
use tokio::sync::oneshot;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, CoordinatorError>>;

/// Everything the coordinator reacts to apart from transport events.
#[derive(Debug)]
pub(crate) enum CoordinatorCommand {
    JoinRoom { room: RoomName, reply: Reply<()> },

    /// Calls `to`, or the last discovered member when `None`.
    Call {
        to: Option<ChannelHandle>,
        reply: Reply<()>,
    },

    AttachTracks { reply: Reply<()> },

    /// Replies with the new muted flag.
    ToggleMute { reply: Reply<bool> },

    /// Replies with the new camera-off flag.
    ToggleCamera { reply: Reply<bool> },

    StartScreenShare { reply: Reply<()> },

    StopScreenShare { reply: Reply<()> },

    RaiseHand { raised: bool, reply: Reply<()> },

    HangUp { reply: Reply<()> },

    /// Frame pushed by the relay.
    Signal(ServerMessage),

    Snapshot {
        reply: oneshot::Sender<CoordinatorSnapshot>,
    },

    /// Camera and microphone capture finished. Sent by the coordinator to itself.
    MediaCaptured(Result<MediaStream, MediaError>),

    /// Display capture for a screen share finished.
    DisplayCaptured(Result<LocalTrack, MediaError>),
}
