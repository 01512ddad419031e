use crate::coordinator::CoordinatorHandle;
use crate::error::SignalingError;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use peerlink_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket link to the relay.
///
/// Frames are written by a background task so `send` never waits on the
/// socket. Dropping every clone closes the writer and with it the socket.
#[derive(Clone)]
pub struct RelayConnection {
    tx: mpsc::UnboundedSender<String>,
}

impl RelayConnection {
    /// Opens the socket and returns the connection plus the stream of frames
    /// the relay pushes to us.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerMessage>), SignalingError> {
        let (ws_stream, _) = connect_async(url).await?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerMessage>();

        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if sink.send(Message::text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(Ok(frame)) = stream.next().await {
                match frame {
                    Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(msg) => {
                            if in_tx.send(msg).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid frame from relay: {}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            debug!("Relay read loop finished");
        });

        Ok((Self { tx: out_tx }, in_rx))
    }

    /// Pumps relay frames into a coordinator until either side goes away.
    pub fn spawn_forwarder(
        mut inbound: mpsc::UnboundedReceiver<ServerMessage>,
        handle: CoordinatorHandle,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(msg) = inbound.recv().await {
                if handle.deliver(msg).await.is_err() {
                    break;
                }
            }
        })
    }
}

#[async_trait]
impl SignalingOutput for RelayConnection {
    async fn send(&self, msg: ClientMessage) -> Result<(), SignalingError> {
        debug!("Sending '{}' to relay", msg.event_name());
        let text = serde_json::to_string(&msg)?;
        self.tx.send(text).map_err(|_| SignalingError::Closed)
    }
}
