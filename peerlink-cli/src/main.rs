use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use peerlink_server::{DEFAULT_PORT, RelayConfig, serve};
use std::net::{Ipv4Addr, SocketAddr};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peerlink-relay")]
#[command(about = "Signaling relay for two-party calls")]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Origin allowed by CORS. Any origin when unset or "*".
    #[arg(long, env = "CLIENT_URL")]
    allowed_origin: Option<String>,

    /// Log filter, e.g. "info" or "peerlink_server=debug".
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log).context("Invalid log filter")?)
        .init();

    let config = RelayConfig {
        listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.port)),
        allowed_origin: cli.allowed_origin,
    };

    println!("{}", "Starting peerlink relay...".green().bold());
    println!("   Listening: {}", config.listen_addr.to_string().cyan());
    println!(
        "   Origin:    {}",
        config.allowed_origin.as_deref().unwrap_or("*").cyan()
    );

    serve(config).await.context("Relay stopped")?;
    Ok(())
}
