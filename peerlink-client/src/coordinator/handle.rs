use crate::coordinator::command::{CoordinatorCommand, Reply};
use crate::coordinator::CoordinatorSnapshot;
use crate::error::CoordinatorError;
use peerlink_core::{ChannelHandle, RoomName, ServerMessage};
use tokio::sync::{mpsc, oneshot};

/// Cheap, cloneable front door to a running [`Coordinator`](super::Coordinator).
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    pub(crate) fn new(tx: mpsc::Sender<CoordinatorCommand>) -> Self {
        Self { tx }
    }

    pub async fn join_room(&self, room: impl Into<RoomName>) -> Result<(), CoordinatorError> {
        let room = room.into();
        self.request(|reply| CoordinatorCommand::JoinRoom { room, reply })
            .await
    }

    pub async fn call(&self, to: Option<ChannelHandle>) -> Result<(), CoordinatorError> {
        self.request(|reply| CoordinatorCommand::Call { to, reply })
            .await
    }

    pub async fn attach_tracks(&self) -> Result<(), CoordinatorError> {
        self.request(|reply| CoordinatorCommand::AttachTracks { reply })
            .await
    }

    /// Returns `true` when the microphone is now muted.
    pub async fn toggle_mute(&self) -> Result<bool, CoordinatorError> {
        self.request(|reply| CoordinatorCommand::ToggleMute { reply })
            .await
    }

    /// Returns `true` when the camera is now off.
    pub async fn toggle_camera(&self) -> Result<bool, CoordinatorError> {
        self.request(|reply| CoordinatorCommand::ToggleCamera { reply })
            .await
    }

    pub async fn start_screen_share(&self) -> Result<(), CoordinatorError> {
        self.request(|reply| CoordinatorCommand::StartScreenShare { reply })
            .await
    }

    pub async fn stop_screen_share(&self) -> Result<(), CoordinatorError> {
        self.request(|reply| CoordinatorCommand::StopScreenShare { reply })
            .await
    }

    pub async fn raise_hand(&self, raised: bool) -> Result<(), CoordinatorError> {
        self.request(|reply| CoordinatorCommand::RaiseHand { raised, reply })
            .await
    }

    pub async fn hang_up(&self) -> Result<(), CoordinatorError> {
        self.request(|reply| CoordinatorCommand::HangUp { reply })
            .await
    }

    /// Queues a relay frame. Returns once it is queued, not once handled.
    pub async fn deliver(&self, msg: ServerMessage) -> Result<(), CoordinatorError> {
        self.tx
            .send(CoordinatorCommand::Signal(msg))
            .await
            .map_err(|_| CoordinatorError::Stopped)
    }

    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorCommand::Snapshot { reply })
            .await
            .map_err(|_| CoordinatorError::Stopped)?;
        rx.await.map_err(|_| CoordinatorError::Stopped)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> CoordinatorCommand,
    ) -> Result<T, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| CoordinatorError::Stopped)?;
        rx.await.map_err(|_| CoordinatorError::Stopped)?
    }
}
