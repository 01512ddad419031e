use peerlink_client::{CallState, CoordinatorError, CoordinatorEvent, MediaError};
use peerlink_core::{ChannelHandle, ServerMessage, SessionDescription};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_media_failure_returns_to_idle() {
    init_tracing();

    let mut alice = TestPeer::spawn("alice");
    alice.media.fail_with(MediaError::PermissionDenied).await;

    let result = alice.handle.call(Some(ChannelHandle::new())).await;
    assert!(matches!(
        result,
        Err(CoordinatorError::Media(MediaError::PermissionDenied))
    ));

    let snapshot = alice.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CallState::Idle);
    assert_eq!(snapshot.local_description, None);
    assert!(alice.outbox_is_silent().await);
    assert!(alice.transport.calls().await.is_empty());
}

#[tokio::test]
async fn test_media_failure_on_incoming_call() {
    init_tracing();

    let mut bob = TestPeer::spawn("bob");
    bob.media.fail_with(MediaError::PermissionDenied).await;

    bob.deliver(ServerMessage::IncomingCall {
        from: ChannelHandle::new(),
        offer: SessionDescription::offer("alice-offer-1"),
    })
    .await
    .unwrap();

    let event = bob
        .wait_for_event(|e| matches!(e, CoordinatorEvent::Error(_)))
        .await
        .unwrap();
    assert!(matches!(
        event,
        CoordinatorEvent::Error(CoordinatorError::Media(MediaError::PermissionDenied))
    ));

    let snapshot = bob.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CallState::Idle);
    assert_eq!(snapshot.remote_description, None);
    assert!(bob.outbox_is_silent().await);
}
