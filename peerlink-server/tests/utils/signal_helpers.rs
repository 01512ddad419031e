use anyhow::{Context, Result};
use peerlink_server::{Relay, RelayConfig, serve_on};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Timeout for a frame that is expected to arrive (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// How long to listen before concluding nothing was delivered (ms).
pub const SILENCE_WINDOW_MS: u64 = 200;

/// Starts a relay on an ephemeral local port.
pub async fn spawn_test_relay() -> Result<(SocketAddr, Relay)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind test listener")?;
    let addr = listener.local_addr()?;
    let relay = Relay::new();

    let serve_relay = relay.clone();
    tokio::spawn(async move {
        let config = RelayConfig::default();
        if let Err(e) = serve_on(listener, serve_relay, &config).await {
            tracing::error!("[SignalHelper] test relay stopped: {}", e);
        }
    });

    Ok((addr, relay))
}

pub fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{}/ws", addr)
}
