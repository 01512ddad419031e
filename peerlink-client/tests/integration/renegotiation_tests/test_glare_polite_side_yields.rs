use peerlink_client::{CoordinatorEvent, TransportEvent};
use peerlink_core::{ClientMessage, ServerMessage, SessionDescription};

use crate::integration::init_tracing;
use crate::utils::{MockMediaDevices, TestPeer, TransportCall, manual_attach, ordered_handles};

#[tokio::test]
async fn test_glare_polite_side_yields() {
    init_tracing();

    let (smaller, larger) = ordered_handles();
    let mut alice = TestPeer::spawn_with("alice", MockMediaDevices::new("alice"), manual_attach);
    alice.assign_handle(smaller).await.unwrap();
    alice
        .connect_as_caller(larger, SessionDescription::answer("bob-answer-1"))
        .await
        .unwrap();

    alice.transport.emit(TransportEvent::NegotiationNeeded).await;
    assert!(matches!(
        alice.next_sent().await.unwrap(),
        ClientMessage::NegotiationNeeded { .. }
    ));

    let bob_offer = SessionDescription::offer("bob-offer-2");
    alice
        .deliver(ServerMessage::NegotiationNeeded {
            from: larger,
            offer: bob_offer.clone(),
        })
        .await
        .unwrap();

    alice
        .wait_for_event(|e| matches!(e, CoordinatorEvent::Glare { yielded: true }))
        .await
        .unwrap();

    let ClientMessage::NegotiationDone { to, answer } = alice.next_sent().await.unwrap() else {
        panic!("Expected peer:nego:done");
    };
    assert_eq!(to, larger);
    assert!(!answer.is_offer());

    // Our own round is re-queued once theirs is answered.
    assert!(matches!(
        alice.next_sent().await.unwrap(),
        ClientMessage::NegotiationNeeded { to, .. } if to == larger
    ));

    let calls = alice.transport.calls().await;
    let rollback = calls.iter().position(|c| *c == TransportCall::Rollback);
    let applied = calls
        .iter()
        .position(|c| *c == TransportCall::SetRemote(bob_offer.clone()));
    assert!(rollback.is_some());
    assert!(rollback < applied);
}
