//! Desktop/mobile pairing relay
//!
//! A relay that pairs a user's desktop and mobile device and forwards
//! packets between them over long-lived streams.
//!
//! - [`registry`]: which connection is live for each (user, role)
//! - [`router`]: delivery of a packet to its destination device
//! - [`session`]: per-stream state machine (first packet registers)
//! - [`pairing`]: one-shot pairing status queries
//! - [`server`]: TCP listener and connection loop
//!
//! # Example
//!
//! ```no_run
//! use pairing_relay::{RelayServer, ServerConfig, TrustedIdentity};
//!
//! # async fn example() -> pairing_relay::error::Result<()> {
//! let server = RelayServer::new(ServerConfig::default(), TrustedIdentity);
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod identity;
pub mod pairing;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod stats;

pub use client::RelayClient;
pub use error::{Error, Result};
pub use identity::{IdentityError, IdentityVerifier, TrustedIdentity};
pub use pairing::PairingService;
pub use protocol::{DeviceRole, Packet, PairingInfo};
pub use registry::{ConnectionRegistry, RouteError};
pub use router::PacketRouter;
pub use server::{RelayServer, ServerConfig};
pub use session::StreamSession;
