pub use peerlink_core::{ChannelHandle, Identity, RoomName};

pub mod model {
    pub use peerlink_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use peerlink_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use peerlink_client::*;
}
