use std::net::SocketAddr;
use thiserror::Error;

/// Startup failures of the relay process. Nothing here is ever reported to a
/// connected client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid allowed origin {origin:?}")]
    InvalidOrigin { origin: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("relay server stopped: {0}")]
    Serve(#[from] std::io::Error),
}
