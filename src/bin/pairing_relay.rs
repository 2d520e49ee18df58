//! Pairing relay server binary
//!
//! Run with: `pairing-relay --port 50051`
//! Log level is taken from `RUST_LOG` (default `info`).

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pairing_relay::protocol::constants::DEFAULT_MAX_FRAME_SIZE;
use pairing_relay::{RelayServer, ServerConfig, TrustedIdentity};

/// Desktop/mobile pairing relay
#[derive(Parser, Debug)]
#[command(name = "pairing-relay", version, about = "Desktop/mobile pairing relay")]
struct Args {
    /// Address to bind to
    #[arg(long, env = "PAIRING_RELAY_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 50051)]
    port: u16,

    /// Maximum concurrent connections (0 = unlimited)
    #[arg(long, env = "PAIRING_RELAY_MAX_CONNECTIONS", default_value_t = 0)]
    max_connections: usize,

    /// Largest accepted frame body in bytes
    #[arg(long, env = "PAIRING_RELAY_MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    max_frame_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::with_addr(SocketAddr::new(args.bind, args.port))
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_size);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.bind_addr,
        max_connections = config.max_connections,
        "Starting pairing relay"
    );

    let server = RelayServer::new(config, TrustedIdentity);
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Pairing relay stopped");
    Ok(())
}
