use peerlink_client::{CallState, CoordinatorError};
use peerlink_core::{ChannelHandle, ServerMessage, SessionDescription};

use crate::integration::init_tracing;
use crate::utils::{MockMediaDevices, TestPeer, TransportCall, manual_attach};

#[tokio::test]
async fn test_hang_up_terminates() {
    init_tracing();

    let mut alice = TestPeer::spawn_with("alice", MockMediaDevices::new("alice"), manual_attach);
    let bob = ChannelHandle::new();
    alice
        .connect_as_caller(bob, SessionDescription::answer("bob-answer-1"))
        .await
        .unwrap();

    alice.handle.hang_up().await.unwrap();
    alice.handle.hang_up().await.unwrap();

    assert_eq!(alice.snapshot().await.unwrap().state, CallState::Terminated);
    assert_eq!(
        alice
            .transport
            .count(|c| matches!(c, TransportCall::Close))
            .await,
        1
    );

    alice
        .deliver(ServerMessage::NegotiationNeeded {
            from: bob,
            offer: SessionDescription::offer("bob-offer-2"),
        })
        .await
        .unwrap();
    assert!(alice.outbox_is_silent().await);

    assert!(matches!(
        alice.handle.attach_tracks().await,
        Err(CoordinatorError::InvalidState {
            state: CallState::Terminated
        })
    ));
}
