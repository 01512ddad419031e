use async_trait::async_trait;
use peerlink_client::{LocalTrack, PeerTransport, TrackId, TrackKind, TransportError, TransportEvent};
use peerlink_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    CreateOffer,
    CreateAnswer,
    SetLocal(SessionDescription),
    SetRemote(SessionDescription),
    Rollback,
    AddTrack(TrackKind, TrackId),
    ReplaceTrack(TrackKind, TrackId),
    AddIceCandidate(IceCandidate),
    Close,
}

/// Mock PeerTransport that records every call.
///
/// Offers and answers are labelled and numbered so tests can tell which side
/// produced a description. Adding a track reports `NegotiationNeeded`, like a
/// browser peer connection does.
#[derive(Clone)]
pub struct MockTransport {
    label: String,
    calls: Arc<Mutex<Vec<TransportCall>>>,
    descriptions: Arc<AtomicU32>,
    event_tx: mpsc::Sender<TransportEvent>,
}

impl MockTransport {
    /// Create a MockTransport and the event receiver to hand to the coordinator.
    pub fn new(label: &str) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let transport = Self {
            label: label.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            descriptions: Arc::new(AtomicU32::new(0)),
            event_tx,
        };
        (transport, event_rx)
    }

    /// Inject a transport event as if the peer connection raised it.
    pub async fn emit(&self, event: TransportEvent) {
        let _ = self.event_tx.send(event).await;
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, pred: impl Fn(&TransportCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| pred(c)).count()
    }

    pub async fn added_tracks(&self, kind: TrackKind) -> usize {
        self.count(|c| matches!(c, TransportCall::AddTrack(k, _) if *k == kind))
            .await
    }

    async fn record(&self, call: TransportCall) {
        tracing::debug!("[MockTransport:{}] {:?}", self.label, call);
        self.calls.lock().await.push(call);
    }

    fn next_sdp(&self, kind: &str) -> String {
        let n = self.descriptions.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}-{}", self.label, kind, n)
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        self.record(TransportCall::CreateOffer).await;
        Ok(SessionDescription::offer(self.next_sdp("offer")))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        self.record(TransportCall::CreateAnswer).await;
        Ok(SessionDescription::answer(self.next_sdp("answer")))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        self.record(TransportCall::SetLocal(desc)).await;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::SetRemote(desc)).await;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Rollback).await;
        Ok(())
    }

    async fn add_track(&self, track: &LocalTrack) -> Result<(), TransportError> {
        self.record(TransportCall::AddTrack(track.kind(), track.id().clone()))
            .await;
        self.emit(TransportEvent::NegotiationNeeded).await;
        Ok(())
    }

    async fn replace_track(
        &self,
        kind: TrackKind,
        track: &LocalTrack,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::ReplaceTrack(kind, track.id().clone()))
            .await;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        self.record(TransportCall::AddIceCandidate(candidate)).await;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.record(TransportCall::Close).await;
        Ok(())
    }
}
