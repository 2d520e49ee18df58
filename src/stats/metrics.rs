//! Statistics for relay sessions and the server

use std::time::{Duration, Instant};

/// Session-level statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Packets received after registration
    pub packets_received: u64,
    /// Packets delivered to the peer device
    pub packets_routed: u64,
    /// Packets that could not be delivered
    pub route_failures: u64,
    /// ACK and ERROR packets sent back to this device
    pub control_sent: u64,
    /// Packets dropped before registration (missing user ID)
    pub discarded: u64,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of received packets that were delivered
    pub fn delivery_ratio(&self) -> Option<f64> {
        if self.packets_received == 0 {
            None
        } else {
            Some(self.packets_routed as f64 / self.packets_received as f64)
        }
    }
}

/// Server-wide statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    /// Total connections ever accepted
    pub total_connections: u64,
    /// Current active connections
    pub active_connections: u64,
    /// Connections refused because of the connection limit
    pub rejected_connections: u64,
    /// Users with at least one registered device
    pub registered_users: usize,
    /// Registered device connections across all users
    pub registered_devices: usize,
    /// Uptime
    pub uptime: Duration,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Uptime clock for [`ServerStats`]
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started_at: Instant,
}

impl Uptime {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
