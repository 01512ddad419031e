use peerlink_core::{Identity, RoomName, ServerMessage};
use peerlink_server::Relay;

use crate::integration::init_tracing;
use crate::utils::MockChannel;

#[tokio::test]
async fn test_two_members_discover_each_other() {
    init_tracing();

    let relay = Relay::new();
    let mut alice = MockChannel::connect(&relay);
    let mut bob = MockChannel::connect(&relay);
    let mut eve = MockChannel::connect(&relay);

    alice.join(&relay, "alice@x.com", "r1");
    alice.recv().await.expect("alice echo");
    eve.join(&relay, "eve@x.com", "r2");
    eve.recv().await.expect("eve echo");

    bob.join(&relay, "bob@x.com", "r1");

    assert_eq!(
        alice.recv().await.unwrap(),
        ServerMessage::UserJoined {
            identity: Identity::from("bob@x.com"),
            id: bob.handle,
        }
    );
    assert_eq!(
        bob.recv().await.unwrap(),
        ServerMessage::RoomJoined {
            identity: Identity::from("bob@x.com"),
            room: RoomName::from("r1"),
            id: bob.handle,
        }
    );
    assert!(eve.is_silent().await, "other rooms see nothing");
}
