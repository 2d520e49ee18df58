//! Registry error types
//!
//! Error types for delivering packets through the registry.

use std::io;

use crate::protocol::DeviceRole;

/// Failure writing to a stream handle
#[derive(Debug)]
pub enum SendError {
    /// The handle's connection has already been shut down
    Closed,
    /// Underlying transport write failed
    Io(io::Error),
    /// Packet could not be encoded
    Encode(crate::error::ProtocolError),
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::Closed => write!(f, "stream closed"),
            SendError::Io(e) => write!(f, "transport send failed: {}", e),
            SendError::Encode(e) => write!(f, "failed to encode packet: {}", e),
        }
    }
}

impl std::error::Error for SendError {}

impl From<io::Error> for SendError {
    fn from(e: io::Error) -> Self {
        SendError::Io(e)
    }
}

/// Error type for routing operations
#[derive(Debug)]
pub enum RouteError {
    /// Destination role not currently registered for the user
    NoConnection { user: String, role: DeviceRole },
    /// Broadcast target has no registered devices at all
    UserNotConnected(String),
    /// Send to the resolved handle failed
    Send { role: DeviceRole, source: SendError },
}

impl RouteError {
    pub fn is_no_connection(&self) -> bool {
        matches!(self, RouteError::NoConnection { .. })
    }
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::NoConnection { user, role } => {
                write!(f, "destination device {} not connected for user {}", role, user)
            }
            RouteError::UserNotConnected(user) => write!(f, "no connections for user {}", user),
            RouteError::Send { role, source } => {
                write!(f, "failed to deliver to {}: {}", role, source)
            }
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Send { source, .. } => Some(source),
            _ => None,
        }
    }
}
