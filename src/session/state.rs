//! Session state machine
//!
//! Tracks one streaming connection from accept to close:
//!
//! ```text
//! Unregistered ──first packet with user──► Registered ──EOF / error──► Closed
//!      │                                                                 ▲
//!      └──────────────────────── EOF / error ────────────────────────────┘
//! ```

use std::time::Instant;

use crate::protocol::DeviceRole;
use crate::stats::SessionStats;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connected, no identifying packet seen yet
    Unregistered,
    /// Bound to (user, role) and present in the registry
    Registered,
    /// Terminal
    Closed,
}

/// Complete session state
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID (same as the connection's handle ID)
    pub id: u64,

    /// Current phase
    pub phase: SessionPhase,

    /// User this session is bound to
    user: Option<String>,

    /// Role this session is bound to
    role: Option<DeviceRole>,

    /// Connection start time
    pub connected_at: Instant,

    /// Time when the session registered
    pub registered_at: Option<Instant>,

    /// Per-session counters
    pub stats: SessionStats,
}

impl SessionState {
    /// Create a new session state
    pub fn new(id: u64) -> Self {
        Self {
            id,
            phase: SessionPhase::Unregistered,
            user: None,
            role: None,
            connected_at: Instant::now(),
            registered_at: None,
            stats: SessionStats::new(),
        }
    }

    /// Bind to (user, role)
    ///
    /// Only valid from `Unregistered`; returns false otherwise.
    pub fn bind(&mut self, user: String, role: DeviceRole) -> bool {
        if self.phase != SessionPhase::Unregistered {
            return false;
        }
        self.user = Some(user);
        self.role = Some(role);
        self.phase = SessionPhase::Registered;
        self.registered_at = Some(Instant::now());
        true
    }

    /// Move to `Closed`
    ///
    /// Returns the binding the first time a registered session closes, so the
    /// caller unregisters exactly once.
    pub fn close(&mut self) -> Option<(String, DeviceRole)> {
        let was_registered = self.phase == SessionPhase::Registered;
        self.phase = SessionPhase::Closed;

        if was_registered {
            match (self.user.clone(), self.role) {
                (Some(user), Some(role)) => Some((user, role)),
                _ => None,
            }
        } else {
            None
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn role(&self) -> Option<DeviceRole> {
        self.role
    }

    pub fn is_registered(&self) -> bool {
        self.phase == SessionPhase::Registered
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Closed
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut state = SessionState::new(1);
        assert_eq!(state.phase, SessionPhase::Unregistered);
        assert!(state.user().is_none());

        assert!(state.bind("u1".into(), DeviceRole::Desktop));
        assert_eq!(state.phase, SessionPhase::Registered);
        assert!(state.is_registered());
        assert!(state.registered_at.is_some());
        assert_eq!(state.user(), Some("u1"));
        assert_eq!(state.role(), Some(DeviceRole::Desktop));

        assert_eq!(state.close(), Some(("u1".to_string(), DeviceRole::Desktop)));
        assert!(state.is_closed());
    }

    #[test]
    fn test_close_yields_binding_once() {
        let mut state = SessionState::new(1);
        state.bind("u1".into(), DeviceRole::Mobile);

        assert!(state.close().is_some());
        assert!(state.close().is_none());
    }

    #[test]
    fn test_close_unregistered() {
        let mut state = SessionState::new(1);
        assert!(state.close().is_none());
        assert!(state.is_closed());
    }

    #[test]
    fn test_bind_only_once() {
        let mut state = SessionState::new(1);
        assert!(state.bind("u1".into(), DeviceRole::Desktop));
        assert!(!state.bind("u2".into(), DeviceRole::Mobile));
        assert_eq!(state.user(), Some("u1"));

        state.close();
        assert!(!state.bind("u3".into(), DeviceRole::Mobile));
    }
}
