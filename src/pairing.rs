//! Pairing status queries
//!
//! One-shot requests answered straight from the registry. These never
//! register anything; streaming registration happens only in
//! [`crate::session::StreamSession`].

use std::sync::Arc;

use crate::protocol::{
    new_session_id, PairingInfo, PairingStatusRequest, PairingStatusResponse,
    RegisterDeviceRequest, RegisterDeviceResponse,
};
use crate::registry::ConnectionRegistry;

/// Stateless wrapper over [`ConnectionRegistry::pairing_info`]
#[derive(Clone)]
pub struct PairingService {
    registry: Arc<ConnectionRegistry>,
}

impl PairingService {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Current pairing state for a user
    pub async fn pairing_info(&self, user: &str) -> PairingInfo {
        self.registry.pairing_info(user).await
    }

    /// Issue a session ID and report the caller's current pairing state
    pub async fn register_device(&self, req: &RegisterDeviceRequest) -> RegisterDeviceResponse {
        tracing::info!(user = %req.user, role = %req.role, "Device registration request");

        RegisterDeviceResponse {
            success: true,
            session_id: new_session_id(),
            pairing_info: self.registry.pairing_info(&req.user).await,
        }
    }

    pub async fn pairing_status(&self, req: &PairingStatusRequest) -> PairingStatusResponse {
        let pairing_info = self.registry.pairing_info(&req.user).await;

        PairingStatusResponse {
            paired: pairing_info.is_paired(),
            pairing_info,
        }
    }
}
