use crate::coordinator::command::{CoordinatorCommand, Reply};
use crate::coordinator::{Coordinator, ScreenShare};
use crate::error::{CoordinatorError, MediaError};
use crate::media::{LocalTrack, TrackKind, TrackSource};
use peerlink_core::{ClientMessage, RoomName};
use std::sync::Arc;
use tracing::{debug, info};

impl Coordinator {
    pub(super) async fn join_room(&mut self, room: RoomName) -> Result<(), CoordinatorError> {
        self.ensure_active()?;
        info!("Joining room '{}' as {}", room, self.config.identity);
        self.signaling
            .send(ClientMessage::RoomJoin {
                identity: self.config.identity.clone(),
                room,
            })
            .await?;
        Ok(())
    }

    /// Puts every local track on the connection, keeping one sender per kind.
    /// Running it again with the same tracks changes nothing.
    pub(super) async fn attach_tracks(&mut self) -> Result<(), CoordinatorError> {
        self.ensure_active()?;
        let stream = self
            .local_stream
            .clone()
            .ok_or(CoordinatorError::NoLocalMedia)?;

        for track in stream.tracks() {
            self.attach_track(track).await?;
        }
        Ok(())
    }

    async fn attach_track(&mut self, track: &LocalTrack) -> Result<(), CoordinatorError> {
        let kind = track.kind();

        if kind == TrackKind::Video {
            if let Some(share) = self.screen_share.as_mut() {
                debug!("Screen share active, camera {} restored on stop", track.id());
                share.previous_camera = Some(track.clone());
                return Ok(());
            }
        }

        match self.senders.get(&kind) {
            Some(current) if current == track => {
                debug!("{} track {} already attached", kind, track.id());
                return Ok(());
            }
            Some(_) => self.transport.replace_track(kind, track).await?,
            None => self.transport.add_track(track).await?,
        }

        self.senders.insert(kind, track.clone());
        Ok(())
    }

    pub(super) fn toggle_mute(&mut self) -> Result<bool, CoordinatorError> {
        let track = self.local_track(TrackKind::Audio)?;
        let enabled = !track.is_enabled();
        track.set_enabled(enabled);
        debug!("Microphone {}", if enabled { "unmuted" } else { "muted" });
        Ok(!enabled)
    }

    pub(super) fn toggle_camera(&mut self) -> Result<bool, CoordinatorError> {
        let track = self.local_track(TrackKind::Video)?;
        let enabled = !track.is_enabled();
        track.set_enabled(enabled);
        debug!("Camera {}", if enabled { "on" } else { "off" });
        Ok(!enabled)
    }

    fn local_track(&self, kind: TrackKind) -> Result<LocalTrack, CoordinatorError> {
        let stream = self
            .local_stream
            .as_ref()
            .ok_or(CoordinatorError::NoLocalMedia)?;
        stream
            .tracks()
            .iter()
            .find(|t| t.kind() == kind && t.source() != TrackSource::Screen)
            .cloned()
            .ok_or(CoordinatorError::NoTrack(kind))
    }

    /// Asks for a display track. The reply is held until the capture is on
    /// the video sender or has failed.
    pub(super) fn start_screen_share(&mut self, reply: Reply<()>) {
        if let Err(e) = self.ensure_active() {
            let _ = reply.send(Err(e));
            return;
        }
        if self.screen_share.is_some() || self.display_capture.is_some() {
            let _ = reply.send(Err(CoordinatorError::AlreadySharing));
            return;
        }

        self.display_capture = Some(reply);
        let media = Arc::clone(&self.media);
        self.spawn_capture(
            async move { media.get_display_media().await },
            CoordinatorCommand::DisplayCaptured,
        );
    }

    pub(super) async fn on_display_captured(&mut self, result: Result<LocalTrack, MediaError>) {
        let Some(reply) = self.display_capture.take() else {
            debug!("Display capture finished after the call ended, dropping it");
            return;
        };
        let result = match result {
            Ok(screen) => self.share_screen(screen).await,
            Err(e) => Err(e.into()),
        };
        let _ = reply.send(result);
    }

    async fn share_screen(&mut self, screen: LocalTrack) -> Result<(), CoordinatorError> {
        let previous_camera = self.senders.get(&TrackKind::Video).cloned();

        match previous_camera {
            Some(_) => {
                self.transport
                    .replace_track(TrackKind::Video, &screen)
                    .await?
            }
            None => self.transport.add_track(&screen).await?,
        }

        info!("Screen share {} started", screen.id());
        self.senders.insert(TrackKind::Video, screen.clone());
        self.screen_share = Some(ScreenShare {
            screen,
            previous_camera,
        });
        Ok(())
    }

    /// Puts the camera that was live before the share back on the video
    /// sender. With no remembered camera the screen track stays where it is.
    pub(super) async fn stop_screen_share(&mut self) -> Result<(), CoordinatorError> {
        let Some(share) = self.screen_share.take() else {
            return Ok(());
        };

        let Some(camera) = share.previous_camera.clone() else {
            debug!("No camera to restore after screen share {}", share.screen.id());
            return Ok(());
        };

        if let Err(e) = self
            .transport
            .replace_track(TrackKind::Video, &camera)
            .await
        {
            self.screen_share = Some(share);
            return Err(e.into());
        }

        info!("Screen share {} stopped, camera {} restored", share.screen.id(), camera.id());
        self.senders.insert(TrackKind::Video, camera);
        Ok(())
    }

    pub(super) async fn raise_hand(&mut self, raised: bool) -> Result<(), CoordinatorError> {
        self.ensure_active()?;
        let to = self.remote.ok_or(CoordinatorError::NoRemote)?;
        self.signaling
            .send(ClientMessage::HandRaised {
                to,
                is_raised: raised,
            })
            .await?;
        Ok(())
    }
}
