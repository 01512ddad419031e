use peerlink_core::{ChannelHandle, ClientMessage, SessionDescription};
use peerlink_server::Relay;

use crate::integration::init_tracing;
use crate::utils::MockChannel;

#[tokio::test]
async fn test_unknown_destination_dropped() {
    init_tracing();

    let relay = Relay::new();
    let mut alice = MockChannel::connect(&relay);
    let mut bob = MockChannel::connect(&relay);

    alice.send(
        &relay,
        ClientMessage::UserCall {
            to: ChannelHandle::new(),
            offer: SessionDescription::offer("nobody home"),
        },
    );

    assert!(alice.is_silent().await, "sender must not get a negative ack");
    assert!(bob.is_silent().await, "nothing may be delivered elsewhere");
    assert_eq!(relay.stats().dropped, 1);
    assert_eq!(relay.stats().forwarded, 0);
}
