use crate::coordinator::CallState;
use crate::media::TrackKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("permission to capture media was denied")]
    PermissionDenied,

    #[error("no capture device for {0}")]
    NotFound(TrackKind),

    #[error("media capture failed: {0}")]
    Capture(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("peer connection is closed")]
    Closed,

    #[error("no sender for {0} track")]
    NoSender(TrackKind),

    #[error("webrtc: {0}")]
    Webrtc(String),
}

impl From<webrtc::Error> for TransportError {
    fn from(e: webrtc::Error) -> Self {
        TransportError::Webrtc(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("relay connection is closed")]
    Closed,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Failure of a coordinator operation. Reported to whoever triggered it and
/// never tears down an otherwise healthy call.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("operation not allowed while {state:?}")]
    InvalidState { state: CallState },

    #[error("no remote participant is known")]
    NoRemote,

    #[error("no local media has been captured")]
    NoLocalMedia,

    #[error("no local {0} track")]
    NoTrack(TrackKind),

    #[error("screen share is already active")]
    AlreadySharing,

    #[error("call ended before local media was ready")]
    Abandoned,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error("coordinator has stopped")]
    Stopped,
}
