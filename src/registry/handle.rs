//! Stream handle abstraction
//!
//! The registry never owns a connection. It holds a shared [`StreamHandle`]
//! whose only capability is delivering a packet to the device behind it.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::SendError;
use crate::protocol::Packet;

/// Send capability of one connected device
///
/// Implementations must serialize concurrent `send` calls so frames from
/// different routers never interleave on the wire.
#[async_trait]
pub trait PacketSink: Send + Sync {
    /// Identifier of the connection behind this handle
    fn id(&self) -> u64;

    /// Deliver one packet
    async fn send(&self, packet: &Packet) -> Result<(), SendError>;
}

/// Shared, non-owning reference to a connection's send side
pub type StreamHandle = Arc<dyn PacketSink>;
