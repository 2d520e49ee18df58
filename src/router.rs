//! Packet routing between paired devices

use std::sync::Arc;

use crate::protocol::Packet;
use crate::registry::{ConnectionRegistry, RouteError};

/// Delivers packets to registered device connections
///
/// Read-only over the registry: routing never registers or removes a device,
/// even when a delivery fails.
#[derive(Clone)]
pub struct PacketRouter {
    registry: Arc<ConnectionRegistry>,
}

impl PacketRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Deliver a packet to its destination device
    ///
    /// The registry lock is released before sending, so a slow destination
    /// only delays this call.
    pub async fn route_packet(&self, packet: &Packet) -> Result<(), RouteError> {
        let handle = self
            .registry
            .lookup(&packet.user, packet.destination)
            .await
            .ok_or_else(|| RouteError::NoConnection {
                user: packet.user.clone(),
                role: packet.destination,
            })?;

        if let Err(e) = handle.send(packet).await {
            tracing::warn!(
                user = %packet.user,
                destination = %packet.destination,
                error = %e,
                "Error sending packet"
            );
            return Err(RouteError::Send {
                role: packet.destination,
                source: e,
            });
        }

        tracing::debug!(
            user = %packet.user,
            source = %packet.source,
            destination = %packet.destination,
            kind = %packet.kind(),
            packet_id = %packet.id,
            "Routed packet"
        );
        Ok(())
    }

    /// Send a packet to every device registered for a user
    ///
    /// Every device gets an attempt. Only the last failure is returned;
    /// earlier ones are logged.
    pub async fn broadcast_to_user(&self, user: &str, packet: &Packet) -> Result<(), RouteError> {
        let handles = self.registry.handles_for(user).await;
        if handles.is_empty() {
            return Err(RouteError::UserNotConnected(user.to_string()));
        }

        let mut last_err = None;
        for (role, handle) in handles {
            if let Err(e) = handle.send(packet).await {
                tracing::warn!(user = %user, role = %role, error = %e, "Error broadcasting");
                last_err = Some(RouteError::Send { role, source: e });
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
