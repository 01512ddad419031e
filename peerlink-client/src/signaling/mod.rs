mod relay_connection;

pub use relay_connection::*;

use crate::error::SignalingError;
use async_trait::async_trait;
use peerlink_core::ClientMessage;

/// Outgoing half of the signaling link, implemented by whatever carries
/// frames to the relay.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, msg: ClientMessage) -> Result<(), SignalingError>;
}
