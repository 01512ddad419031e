use peerlink_core::Identity;
use peerlink_server::Relay;

use crate::integration::init_tracing;
use crate::utils::MockChannel;

#[tokio::test]
async fn test_rejoin_last_write_wins() {
    init_tracing();

    let relay = Relay::new();
    let alice = Identity::from("alice@x.com");
    let channels: Vec<MockChannel> = (0..3).map(|_| MockChannel::connect(&relay)).collect();

    for channel in &channels {
        channel.join(&relay, "alice@x.com", "r1");
        assert_eq!(relay.channel_for(&alice), Some(channel.handle));
    }

    let owners: Vec<_> = channels
        .iter()
        .filter(|c| relay.identity_of(&c.handle).as_ref() == Some(&alice))
        .map(|c| c.handle)
        .collect();
    assert_eq!(owners, vec![channels[2].handle]);

    // The superseded channel closing must not erase the live mapping.
    relay.disconnect(&channels[0].handle);
    assert_eq!(relay.channel_for(&alice), Some(channels[2].handle));
}
