mod channel;
mod identity;
mod room;
mod session;
mod signaling;

pub use channel::ChannelHandle;
pub use identity::Identity;
pub use room::RoomName;
pub use session::{IceCandidate, SdpType, SessionDescription};
pub use signaling::{ClientMessage, IceServerConfig, ServerMessage};
