//! Connection registry implementation
//!
//! The central map of which device connections are live for each user.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::handle::StreamHandle;
use crate::protocol::{DeviceRole, PairingInfo};

/// Per-user map of role to handle
type DeviceSlots = HashMap<DeviceRole, StreamHandle>;

/// Registry of live device connections
///
/// Thread-safe via `RwLock`. Lookups and pairing queries take the read lock;
/// register/unregister take the write lock. No lock is ever held across a
/// send, so a stalled device cannot block other users.
pub struct ConnectionRegistry {
    /// Map of user ID to that user's connected devices
    users: RwLock<HashMap<String, DeviceSlots>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Register a device connection for a user
    ///
    /// Replaces any existing handle for the same (user, role). The replaced
    /// handle is dropped, not closed; its session only notices on its next
    /// failed send or receive.
    pub async fn register(&self, user: &str, role: DeviceRole, handle: StreamHandle) {
        let mut users = self.users.write().await;
        let new_id = handle.id();

        let slots = users.entry(user.to_string()).or_default();
        if let Some(previous) = slots.insert(role, handle) {
            tracing::info!(
                user = %user,
                role = %role,
                previous = previous.id(),
                replacement = new_id,
                "Replacing existing device connection"
            );
        } else {
            tracing::info!(user = %user, role = %role, connection = new_id, "Device registered");
        }
    }

    /// Remove a device connection
    ///
    /// Drops the user entirely once no roles remain. No-op if absent.
    pub async fn unregister(&self, user: &str, role: DeviceRole) {
        let mut users = self.users.write().await;

        let Some(slots) = users.get_mut(user) else {
            return;
        };

        if slots.remove(&role).is_some() {
            tracing::info!(user = %user, role = %role, "Device unregistered");
        }

        if slots.is_empty() {
            users.remove(user);
            tracing::debug!(user = %user, "No devices left, user removed");
        }
    }

    /// Look up the handle registered for (user, role)
    pub async fn lookup(&self, user: &str, role: DeviceRole) -> Option<StreamHandle> {
        let users = self.users.read().await;
        users.get(user).and_then(|slots| slots.get(&role)).cloned()
    }

    /// Snapshot of every handle registered for a user, ordered by role
    pub async fn handles_for(&self, user: &str) -> Vec<(DeviceRole, StreamHandle)> {
        let users = self.users.read().await;

        let mut handles: Vec<_> = users
            .get(user)
            .map(|slots| {
                slots
                    .iter()
                    .map(|(role, handle)| (*role, handle.clone()))
                    .collect()
            })
            .unwrap_or_default();
        handles.sort_by_key(|(role, _)| *role);
        handles
    }

    /// Online state of both roles for a user
    pub async fn pairing_info(&self, user: &str) -> PairingInfo {
        let users = self.users.read().await;

        match users.get(user) {
            Some(slots) => PairingInfo {
                desktop_online: slots.contains_key(&DeviceRole::Desktop),
                mobile_online: slots.contains_key(&DeviceRole::Mobile),
            },
            None => PairingInfo::default(),
        }
    }

    /// Check if a user has any registered device
    pub async fn contains_user(&self, user: &str) -> bool {
        self.users.read().await.contains_key(user)
    }

    /// Number of users with at least one device
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Total number of registered device connections
    pub async fn connection_count(&self) -> usize {
        self.users.read().await.values().map(HashMap::len).sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::protocol::{ControlMessage, Packet};
    use crate::registry::handle::PacketSink;
    use crate::registry::testing::RecordingSink;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = ConnectionRegistry::new();
        let handle = RecordingSink::new(1);

        registry.register("u1", DeviceRole::Desktop, handle).await;

        let found = registry.lookup("u1", DeviceRole::Desktop).await.unwrap();
        assert_eq!(found.id(), 1);
        assert!(registry.lookup("u1", DeviceRole::Mobile).await.is_none());
        assert!(registry.lookup("u2", DeviceRole::Desktop).await.is_none());
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = ConnectionRegistry::new();
        let first = RecordingSink::new(1);
        let second = RecordingSink::new(2);

        registry.register("u1", DeviceRole::Desktop, first.clone()).await;
        registry.register("u1", DeviceRole::Desktop, second).await;

        let found = registry.lookup("u1", DeviceRole::Desktop).await.unwrap();
        assert_eq!(found.id(), 2);
        assert_eq!(registry.connection_count().await, 1);

        // Registry released its reference; the handle itself is untouched
        assert_eq!(Arc::strong_count(&first), 1);
        let ack = Packet::control("u1", DeviceRole::Desktop, ControlMessage::ack("still usable"));
        assert!(first.send(&ack).await.is_ok());
    }

    #[tokio::test]
    async fn test_unregister_last_role_removes_user() {
        let registry = ConnectionRegistry::new();
        registry.register("u1", DeviceRole::Desktop, RecordingSink::new(1)).await;
        registry.register("u1", DeviceRole::Mobile, RecordingSink::new(2)).await;

        registry.unregister("u1", DeviceRole::Desktop).await;
        assert!(registry.contains_user("u1").await);
        assert!(registry.lookup("u1", DeviceRole::Mobile).await.is_some());

        registry.unregister("u1", DeviceRole::Mobile).await;
        assert!(!registry.contains_user("u1").await);
        assert_eq!(registry.user_count().await, 0);
        for role in [DeviceRole::Desktop, DeviceRole::Mobile, DeviceRole::Unknown] {
            assert!(registry.lookup("u1", role).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();

        registry.unregister("ghost", DeviceRole::Mobile).await;
        assert_eq!(registry.user_count().await, 0);

        registry.register("u1", DeviceRole::Desktop, RecordingSink::new(1)).await;
        registry.unregister("u1", DeviceRole::Mobile).await;
        registry.unregister("u1", DeviceRole::Mobile).await;
        assert!(registry.lookup("u1", DeviceRole::Desktop).await.is_some());
    }

    #[tokio::test]
    async fn test_pairing_info() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.pairing_info("u1").await, PairingInfo::new(false, false));

        registry.register("u1", DeviceRole::Desktop, RecordingSink::new(1)).await;
        assert_eq!(registry.pairing_info("u1").await, PairingInfo::new(true, false));

        registry.register("u1", DeviceRole::Mobile, RecordingSink::new(2)).await;
        assert_eq!(registry.pairing_info("u1").await, PairingInfo::new(true, true));

        registry.unregister("u1", DeviceRole::Desktop).await;
        assert_eq!(registry.pairing_info("u1").await, PairingInfo::new(false, true));
    }

    #[tokio::test]
    async fn test_unknown_role_not_counted_as_paired() {
        let registry = ConnectionRegistry::new();
        registry.register("u1", DeviceRole::Unknown, RecordingSink::new(1)).await;

        assert_eq!(registry.pairing_info("u1").await, PairingInfo::default());
        assert!(registry.contains_user("u1").await);
    }

    #[tokio::test]
    async fn test_handles_for_sorted_by_role() {
        let registry = ConnectionRegistry::new();
        registry.register("u1", DeviceRole::Unknown, RecordingSink::new(3)).await;
        registry.register("u1", DeviceRole::Mobile, RecordingSink::new(2)).await;
        registry.register("u1", DeviceRole::Desktop, RecordingSink::new(1)).await;

        let roles: Vec<_> = registry
            .handles_for("u1")
            .await
            .into_iter()
            .map(|(role, _)| role)
            .collect();
        assert_eq!(
            roles,
            vec![DeviceRole::Desktop, DeviceRole::Mobile, DeviceRole::Unknown]
        );
        assert!(registry.handles_for("u2").await.is_empty());
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let registry = ConnectionRegistry::new();
        registry.register("u1", DeviceRole::Desktop, RecordingSink::new(1)).await;
        registry.register("u2", DeviceRole::Desktop, RecordingSink::new(2)).await;

        registry.unregister("u1", DeviceRole::Desktop).await;

        assert_eq!(registry.user_count().await, 1);
        assert_eq!(
            registry.lookup("u2", DeviceRole::Desktop).await.unwrap().id(),
            2
        );
    }
}
