use crate::{Relay, RelayError, ws_handler};
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

pub const DEFAULT_PORT: u16 = 8000;

/// Process startup parameters of the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen_addr: SocketAddr,
    /// Browser origin allowed by CORS. `None` or `"*"` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            allowed_origin: None,
        }
    }
}

impl RelayConfig {
    fn cors_layer(&self) -> Result<CorsLayer, RelayError> {
        let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

        match self.allowed_origin.as_deref() {
            None | Some("*") => Ok(cors.allow_origin(Any)),
            Some(origin) => {
                let value =
                    HeaderValue::from_str(origin).map_err(|_| RelayError::InvalidOrigin {
                        origin: origin.to_owned(),
                    })?;
                Ok(cors
                    .allow_origin(AllowOrigin::exact(value))
                    .allow_credentials(true))
            }
        }
    }
}

/// Routes: `GET /ws` upgrades to the signaling socket.
pub fn router(relay: Relay, config: &RelayConfig) -> Result<Router, RelayError> {
    Ok(Router::new()
        .route("/ws", get(ws_handler))
        .layer(config.cors_layer()?)
        .with_state(relay))
}

pub async fn serve(config: RelayConfig) -> Result<(), RelayError> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| RelayError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    serve_on(listener, Relay::new(), &config).await
}

/// Serves on an already bound listener, which lets callers pick port 0.
pub async fn serve_on(
    listener: TcpListener,
    relay: Relay,
    config: &RelayConfig,
) -> Result<(), RelayError> {
    let app = router(relay, config)?;
    info!("Signaling relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
