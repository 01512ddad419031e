use peerlink_client::{CallState, CoordinatorEvent};
use peerlink_core::{ChannelHandle, ServerMessage, SessionDescription};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_unexpected_answer_ignored() {
    init_tracing();

    let mut alice = TestPeer::spawn("alice");
    let stranger = ChannelHandle::new();

    alice
        .deliver(ServerMessage::CallAccepted {
            from: stranger,
            answer: SessionDescription::answer("bogus"),
        })
        .await
        .unwrap();

    let event = alice
        .wait_for_event(|e| matches!(e, CoordinatorEvent::ProtocolAnomaly { .. }))
        .await
        .unwrap();
    assert!(matches!(
        event,
        CoordinatorEvent::ProtocolAnomaly {
            event: "call:accepted",
            ..
        }
    ));

    alice
        .deliver(ServerMessage::NegotiationFinal {
            from: stranger,
            answer: SessionDescription::answer("bogus"),
        })
        .await
        .unwrap();
    alice
        .wait_for_event(|e| matches!(e, CoordinatorEvent::ProtocolAnomaly { .. }))
        .await
        .unwrap();

    let snapshot = alice.snapshot().await.unwrap();
    assert_eq!(snapshot.state, CallState::Idle);
    assert_eq!(snapshot.remote_description, None);
    assert!(alice.transport.calls().await.is_empty());
}

#[tokio::test]
async fn test_answer_from_other_channel_ignored() {
    init_tracing();

    let mut alice = TestPeer::spawn("alice");
    let bob = ChannelHandle::new();

    alice.handle.call(Some(bob)).await.unwrap();
    alice.next_sent().await.unwrap();

    alice
        .deliver(ServerMessage::CallAccepted {
            from: ChannelHandle::new(),
            answer: SessionDescription::answer("mallory-answer"),
        })
        .await
        .unwrap();
    alice
        .wait_for_event(|e| matches!(e, CoordinatorEvent::ProtocolAnomaly { .. }))
        .await
        .unwrap();

    assert_eq!(alice.snapshot().await.unwrap().state, CallState::Offering);
}
