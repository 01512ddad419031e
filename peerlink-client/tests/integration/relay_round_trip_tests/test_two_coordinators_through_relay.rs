use peerlink_client::{CallState, CoordinatorEvent, CoordinatorSnapshot, TrackKind};
use std::time::Duration;
use tokio::time::{Instant, sleep};

use crate::integration::init_tracing;
use crate::utils::{RelayPeer, SIGNAL_TIMEOUT_MS, spawn_test_relay};

fn settled(a: &CoordinatorSnapshot, b: &CoordinatorSnapshot) -> bool {
    a.state == CallState::Connected
        && b.state == CallState::Connected
        && !a.renegotiation_in_flight
        && !b.renegotiation_in_flight
        && a.local_description.is_some()
        && a.remote_description == b.local_description
        && b.remote_description == a.local_description
}

#[tokio::test]
async fn test_two_coordinators_through_relay() {
    init_tracing();

    let (url, relay) = spawn_test_relay().await.unwrap();
    let mut alice = RelayPeer::connect("alice", &url).await.unwrap();
    let mut bob = RelayPeer::connect("bob", &url).await.unwrap();

    alice.handle.join_room("r1").await.unwrap();
    let CoordinatorEvent::JoinedRoom { id: alice_id, .. } = alice
        .wait_for_event(|e| matches!(e, CoordinatorEvent::JoinedRoom { .. }))
        .await
        .unwrap()
    else {
        unreachable!();
    };

    bob.handle.join_room("r1").await.unwrap();
    let CoordinatorEvent::JoinedRoom { id: bob_id, .. } = bob
        .wait_for_event(|e| matches!(e, CoordinatorEvent::JoinedRoom { .. }))
        .await
        .unwrap()
    else {
        unreachable!();
    };

    alice
        .wait_for_event(|e| matches!(e, CoordinatorEvent::MemberJoined { id, .. } if *id == bob_id))
        .await
        .unwrap();

    alice.handle.call(None).await.unwrap();

    let deadline = Instant::now() + Duration::from_millis(SIGNAL_TIMEOUT_MS);
    let (a, b) = loop {
        let a = alice.snapshot().await.unwrap();
        let b = bob.snapshot().await.unwrap();
        if settled(&a, &b) && a.rounds_completed >= 1 {
            break (a, b);
        }
        assert!(Instant::now() < deadline, "calls never settled: {:?} / {:?}", a, b);
        sleep(Duration::from_millis(20)).await;
    };

    assert_eq!(a.remote, Some(bob_id));
    assert_eq!(b.remote, Some(alice_id));
    assert_eq!(a.local_handle, Some(alice_id));
    assert_eq!(b.local_handle, Some(bob_id));
    assert_eq!(a.sender_count(TrackKind::Audio), 1);
    assert_eq!(a.sender_count(TrackKind::Video), 1);
    assert_eq!(bob.transport.added_tracks(TrackKind::Audio).await, 0);
    assert_eq!(relay.stats().dropped, 0);
}
