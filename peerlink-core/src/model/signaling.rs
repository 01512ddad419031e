use crate::model::channel::ChannelHandle;
use crate::model::identity::Identity;
use crate::model::room::RoomName;
use crate::model::session::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Frames a client sends to the relay.
///
/// Every variant except `RoomJoin` is addressed to another channel and is
/// forwarded without inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    #[serde(rename = "room:join")]
    RoomJoin { identity: Identity, room: RoomName },

    #[serde(rename = "user:call")]
    UserCall {
        to: ChannelHandle,
        offer: SessionDescription,
    },

    #[serde(rename = "call:accepted")]
    CallAccepted {
        to: ChannelHandle,
        answer: SessionDescription,
    },

    #[serde(rename = "peer:nego:needed")]
    NegotiationNeeded {
        to: ChannelHandle,
        offer: SessionDescription,
    },

    #[serde(rename = "peer:nego:done")]
    NegotiationDone {
        to: ChannelHandle,
        answer: SessionDescription,
    },

    #[serde(rename = "peer:ice")]
    IceCandidate {
        to: ChannelHandle,
        candidate: IceCandidate,
    },

    #[serde(rename = "hand:raised")]
    HandRaised { to: ChannelHandle, is_raised: bool },
}

/// Frames the relay delivers to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Broadcast to the existing members of a room.
    #[serde(rename = "user:joined")]
    UserJoined { identity: Identity, id: ChannelHandle },

    /// Echo of the caller's own join, carrying its relay-assigned handle.
    #[serde(rename = "room:join")]
    RoomJoined {
        identity: Identity,
        room: RoomName,
        id: ChannelHandle,
    },

    #[serde(rename = "incoming:call")]
    IncomingCall {
        from: ChannelHandle,
        offer: SessionDescription,
    },

    #[serde(rename = "call:accepted")]
    CallAccepted {
        from: ChannelHandle,
        answer: SessionDescription,
    },

    #[serde(rename = "peer:nego:needed")]
    NegotiationNeeded {
        from: ChannelHandle,
        offer: SessionDescription,
    },

    #[serde(rename = "peer:nego:final")]
    NegotiationFinal {
        from: ChannelHandle,
        answer: SessionDescription,
    },

    #[serde(rename = "peer:ice")]
    IceCandidate {
        from: ChannelHandle,
        candidate: IceCandidate,
    },

    #[serde(rename = "hand:raised")]
    HandRaised { from: ChannelHandle, is_raised: bool },
}

impl ClientMessage {
    /// Wire name of the event, for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::RoomJoin { .. } => "room:join",
            ClientMessage::UserCall { .. } => "user:call",
            ClientMessage::CallAccepted { .. } => "call:accepted",
            ClientMessage::NegotiationNeeded { .. } => "peer:nego:needed",
            ClientMessage::NegotiationDone { .. } => "peer:nego:done",
            ClientMessage::IceCandidate { .. } => "peer:ice",
            ClientMessage::HandRaised { .. } => "hand:raised",
        }
    }

    /// Rewrites an addressed frame into the form delivered to its destination,
    /// stamping `from` with the sender's handle. Returns `None` for `RoomJoin`.
    pub fn into_forwarded(self, from: ChannelHandle) -> Option<(ChannelHandle, ServerMessage)> {
        let forwarded = match self {
            ClientMessage::RoomJoin { .. } => return None,
            ClientMessage::UserCall { to, offer } => (to, ServerMessage::IncomingCall { from, offer }),
            ClientMessage::CallAccepted { to, answer } => {
                (to, ServerMessage::CallAccepted { from, answer })
            }
            ClientMessage::NegotiationNeeded { to, offer } => {
                (to, ServerMessage::NegotiationNeeded { from, offer })
            }
            ClientMessage::NegotiationDone { to, answer } => {
                (to, ServerMessage::NegotiationFinal { from, answer })
            }
            ClientMessage::IceCandidate { to, candidate } => {
                (to, ServerMessage::IceCandidate { from, candidate })
            }
            ClientMessage::HandRaised { to, is_raised } => {
                (to, ServerMessage::HandRaised { from, is_raised })
            }
        };
        Some(forwarded)
    }
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::UserJoined { .. } => "user:joined",
            ServerMessage::RoomJoined { .. } => "room:join",
            ServerMessage::IncomingCall { .. } => "incoming:call",
            ServerMessage::CallAccepted { .. } => "call:accepted",
            ServerMessage::NegotiationNeeded { .. } => "peer:nego:needed",
            ServerMessage::NegotiationFinal { .. } => "peer:nego:final",
            ServerMessage::IceCandidate { .. } => "peer:ice",
            ServerMessage::HandRaised { .. } => "hand:raised",
        }
    }

    /// Sender handle of a forwarded frame. Membership events have none.
    pub fn sender(&self) -> Option<ChannelHandle> {
        match self {
            ServerMessage::UserJoined { .. } | ServerMessage::RoomJoined { .. } => None,
            ServerMessage::IncomingCall { from, .. }
            | ServerMessage::CallAccepted { from, .. }
            | ServerMessage::NegotiationNeeded { from, .. }
            | ServerMessage::NegotiationFinal { from, .. }
            | ServerMessage::IceCandidate { from, .. }
            | ServerMessage::HandRaised { from, .. } => Some(*from),
        }
    }
}
