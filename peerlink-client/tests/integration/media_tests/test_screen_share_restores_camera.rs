use peerlink_client::{CoordinatorError, TrackId, TrackKind};
use peerlink_core::{ChannelHandle, SessionDescription};

use crate::integration::init_tracing;
use crate::utils::{MockMediaDevices, TestPeer, TransportCall, manual_attach};

#[tokio::test]
async fn test_screen_share_restores_camera() {
    init_tracing();

    let mut alice = TestPeer::spawn_with("alice", MockMediaDevices::new("alice"), manual_attach);
    alice
        .connect_as_caller(ChannelHandle::new(), SessionDescription::answer("bob-answer-1"))
        .await
        .unwrap();
    alice.handle.attach_tracks().await.unwrap();

    let camera = TrackId("alice-cam".to_string());
    let screen = TrackId("alice-screen-1".to_string());

    alice.handle.start_screen_share().await.unwrap();
    let snapshot = alice.snapshot().await.unwrap();
    assert!(snapshot.screen_sharing);
    assert_eq!(snapshot.sender_track(TrackKind::Video), Some(&screen));

    assert!(matches!(
        alice.handle.start_screen_share().await,
        Err(CoordinatorError::AlreadySharing)
    ));

    // Attaching while sharing must not push the camera over the screen.
    alice.handle.attach_tracks().await.unwrap();
    assert_eq!(
        alice.snapshot().await.unwrap().sender_track(TrackKind::Video),
        Some(&screen)
    );

    alice.handle.stop_screen_share().await.unwrap();

    let snapshot = alice.snapshot().await.unwrap();
    assert!(!snapshot.screen_sharing);
    assert_eq!(snapshot.sender_track(TrackKind::Video), Some(&camera));
    assert_eq!(snapshot.sender_count(TrackKind::Video), 1);
    assert_eq!(alice.transport.added_tracks(TrackKind::Video).await, 1);

    let replaced: Vec<TransportCall> = alice
        .transport
        .calls()
        .await
        .into_iter()
        .filter(|c| matches!(c, TransportCall::ReplaceTrack(..)))
        .collect();
    assert_eq!(
        replaced,
        vec![
            TransportCall::ReplaceTrack(TrackKind::Video, screen),
            TransportCall::ReplaceTrack(TrackKind::Video, camera),
        ]
    );
}
