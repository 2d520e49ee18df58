//! Stream session handler
//!
//! One [`StreamSession`] per streaming connection. The first packet carrying
//! a user ID binds the connection to (user, source role) and registers it;
//! every later packet is routed to the peer device.

use std::sync::Arc;

use super::state::{SessionPhase, SessionState};
use crate::error::{Error, Result};
use crate::protocol::{ControlMessage, Packet};
use crate::registry::{ConnectionRegistry, StreamHandle};
use crate::router::PacketRouter;

/// Per-connection relay state machine
///
/// The session owns its connection's handle; the registry only gets a
/// shared reference for delivery.
pub struct StreamSession {
    state: SessionState,
    handle: StreamHandle,
    registry: Arc<ConnectionRegistry>,
    router: PacketRouter,
}

impl StreamSession {
    pub fn new(handle: StreamHandle, router: PacketRouter) -> Self {
        Self {
            state: SessionState::new(handle.id()),
            registry: Arc::clone(router.registry()),
            handle,
            router,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Process one inbound packet
    ///
    /// An error means the session is over: it has already moved to `Closed`
    /// and unregistered itself.
    pub async fn handle_packet(&mut self, packet: Packet) -> Result<()> {
        let result = match self.state.phase {
            SessionPhase::Unregistered => self.on_first_packet(packet).await,
            SessionPhase::Registered => self.on_packet(packet).await,
            SessionPhase::Closed => return Err(Error::UnexpectedFrame("packet after close")),
        };

        if result.is_err() {
            self.close().await;
        }
        result
    }

    async fn on_first_packet(&mut self, packet: Packet) -> Result<()> {
        if packet.user.is_empty() {
            tracing::debug!(
                session_id = self.state.id,
                packet_id = %packet.id,
                "Invalid packet: missing user_id"
            );
            self.state.stats.discarded += 1;
            return Ok(());
        }

        let user = packet.user;
        let role = packet.source;

        self.registry.register(&user, role, Arc::clone(&self.handle)).await;
        self.state.bind(user.clone(), role);

        let pairing_info = self.registry.pairing_info(&user).await;
        let ack = Packet::control(&user, role, ControlMessage::ack(pairing_info.status_message()));

        if let Err(e) = self.handle.send(&ack).await {
            tracing::warn!(
                session_id = self.state.id,
                user = %user,
                role = %role,
                error = %e,
                "Failed to send pairing info"
            );
            return Err(e.into());
        }
        self.state.stats.control_sent += 1;

        tracing::info!(
            session_id = self.state.id,
            user = %user,
            role = %role,
            desktop_online = pairing_info.desktop_online,
            mobile_online = pairing_info.mobile_online,
            "Device registered and paired"
        );
        Ok(())
    }

    async fn on_packet(&mut self, packet: Packet) -> Result<()> {
        self.state.stats.packets_received += 1;

        let err = match self.router.route_packet(&packet).await {
            Ok(()) => {
                self.state.stats.packets_routed += 1;
                return Ok(());
            }
            Err(e) => e,
        };

        self.state.stats.route_failures += 1;
        tracing::debug!(
            session_id = self.state.id,
            packet_id = %packet.id,
            error = %err,
            "Failed to route packet"
        );

        // Both are set once registered
        let (Some(user), Some(role)) = (self.state.user(), self.state.role()) else {
            return Ok(());
        };
        let notice = Packet::control(user, role, ControlMessage::error(err.to_string()));

        if let Err(e) = self.handle.send(&notice).await {
            tracing::warn!(
                session_id = self.state.id,
                error = %e,
                "Failed to send error packet"
            );
            return Err(e.into());
        }
        self.state.stats.control_sent += 1;
        Ok(())
    }

    /// Close the session, unregistering it if it was registered
    ///
    /// Safe to call more than once.
    pub async fn close(&mut self) {
        let Some((user, role)) = self.state.close() else {
            return;
        };

        self.registry.unregister(&user, role).await;

        let stats = &self.state.stats;
        let registered_secs = self
            .state
            .registered_at
            .map(|at| at.elapsed().as_secs())
            .unwrap_or_default();
        tracing::info!(
            session_id = self.state.id,
            user = %user,
            role = %role,
            packets_received = stats.packets_received,
            packets_routed = stats.packets_routed,
            route_failures = stats.route_failures,
            control_sent = stats.control_sent,
            discarded = stats.discarded,
            delivery_ratio = stats.delivery_ratio().unwrap_or(1.0),
            duration_secs = self.state.duration().as_secs(),
            registered_secs,
            "Stream closed"
        );
    }
}
