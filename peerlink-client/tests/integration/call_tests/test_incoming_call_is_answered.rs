use peerlink_client::CallState;
use peerlink_core::{ChannelHandle, ClientMessage, ServerMessage, SessionDescription};

use crate::integration::init_tracing;
use crate::utils::{TestPeer, TransportCall};

#[tokio::test]
async fn test_incoming_call_is_answered() {
    init_tracing();

    let mut bob = TestPeer::spawn("bob");
    let alice = ChannelHandle::new();
    let offer = SessionDescription::offer("alice-offer-1");

    bob.deliver(ServerMessage::IncomingCall {
        from: alice,
        offer: offer.clone(),
    })
    .await
    .unwrap();

    let ClientMessage::CallAccepted { to, answer } = bob.next_sent().await.unwrap() else {
        panic!("Expected call:accepted");
    };
    assert_eq!(to, alice);
    assert!(!answer.is_offer());

    let snapshot = bob.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CallState::Connected);
    assert_eq!(snapshot.remote, Some(alice));
    assert_eq!(snapshot.remote_description, Some(offer.clone()));
    assert_eq!(snapshot.local_description, Some(answer.clone()));

    assert_eq!(
        bob.transport.calls().await,
        vec![
            TransportCall::SetRemote(offer),
            TransportCall::CreateAnswer,
            TransportCall::SetLocal(answer),
        ]
    );
}
