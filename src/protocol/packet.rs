//! Relay packet types
//!
//! A [`Packet`] carries either opaque application bytes (DATA) or a
//! [`ControlMessage`] (CONTROL). The kind is derived from the payload, so a
//! packet can never claim to be DATA while holding a control message.

use std::fmt;

use bytes::Bytes;

use super::constants::*;
use crate::error::ProtocolError;

/// Device role a connection identifies as
///
/// Ordering is delivery order for broadcasts (desktop, mobile, unknown) and
/// is independent of the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceRole {
    Desktop,
    Mobile,
    /// Synthetic source for server-generated packets
    Unknown,
}

impl DeviceRole {
    /// Wire code for this role
    pub fn code(self) -> u8 {
        match self {
            DeviceRole::Unknown => ROLE_UNKNOWN,
            DeviceRole::Desktop => ROLE_DESKTOP,
            DeviceRole::Mobile => ROLE_MOBILE,
        }
    }

    /// Parse a wire code
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        match code {
            ROLE_UNKNOWN => Ok(DeviceRole::Unknown),
            ROLE_DESKTOP => Ok(DeviceRole::Desktop),
            ROLE_MOBILE => Ok(DeviceRole::Mobile),
            other => Err(ProtocolError::InvalidRole(other)),
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceRole::Unknown => "UNKNOWN",
            DeviceRole::Desktop => "DESKTOP",
            DeviceRole::Mobile => "MOBILE",
        };
        f.write_str(name)
    }
}

/// Packet kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Data,
    Control,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketKind::Data => f.write_str("DATA"),
            PacketKind::Control => f.write_str("CONTROL"),
        }
    }
}

/// Control message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Ack,
    Error,
}

impl ControlKind {
    pub fn code(self) -> u8 {
        match self {
            ControlKind::Ack => CONTROL_ACK,
            ControlKind::Error => CONTROL_ERROR,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        match code {
            CONTROL_ACK => Ok(ControlKind::Ack),
            CONTROL_ERROR => Ok(ControlKind::Error),
            other => Err(ProtocolError::InvalidControlKind(other)),
        }
    }
}

/// Server or peer directed metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMessage {
    pub kind: ControlKind,
    pub text: String,
}

impl ControlMessage {
    pub fn ack(text: impl Into<String>) -> Self {
        Self {
            kind: ControlKind::Ack,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: ControlKind::Error,
            text: text.into(),
        }
    }
}

/// Packet payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Opaque application bytes (zero-copy via reference counting)
    Data(Bytes),
    Control(ControlMessage),
}

/// A single relayed packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Unique packet ID
    pub id: String,
    /// Owning user, asserted by the client
    pub user: String,
    pub source: DeviceRole,
    pub destination: DeviceRole,
    pub payload: Payload,
}

impl Packet {
    /// Create a DATA packet with a fresh ID
    pub fn data(
        user: impl Into<String>,
        source: DeviceRole,
        destination: DeviceRole,
        data: Bytes,
    ) -> Self {
        Self {
            id: new_packet_id(),
            user: user.into(),
            source,
            destination,
            payload: Payload::Data(data),
        }
    }

    /// Create a server-generated CONTROL packet addressed to `destination`
    pub fn control(
        user: impl Into<String>,
        destination: DeviceRole,
        message: ControlMessage,
    ) -> Self {
        Self {
            id: new_packet_id(),
            user: user.into(),
            source: DeviceRole::Unknown,
            destination,
            payload: Payload::Control(message),
        }
    }

    pub fn kind(&self) -> PacketKind {
        match self.payload {
            Payload::Data(_) => PacketKind::Data,
            Payload::Control(_) => PacketKind::Control,
        }
    }

    /// Control message, if this is a CONTROL packet
    pub fn control_message(&self) -> Option<&ControlMessage> {
        match &self.payload {
            Payload::Control(msg) => Some(msg),
            Payload::Data(_) => None,
        }
    }

    /// Application bytes, if this is a DATA packet
    pub fn data_bytes(&self) -> Option<&Bytes> {
        match &self.payload {
            Payload::Data(data) => Some(data),
            Payload::Control(_) => None,
        }
    }
}

/// Generate a fresh packet ID
pub fn new_packet_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generate a fresh opaque session ID for one-shot registration
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Online state of both roles for one user
///
/// Derived from the registry on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairingInfo {
    pub desktop_online: bool,
    pub mobile_online: bool,
}

impl PairingInfo {
    pub fn new(desktop_online: bool, mobile_online: bool) -> Self {
        Self {
            desktop_online,
            mobile_online,
        }
    }

    /// Both roles connected
    pub fn is_paired(&self) -> bool {
        self.desktop_online && self.mobile_online
    }

    /// Human-readable status sent in the registration ACK
    pub fn status_message(&self) -> &'static str {
        match (self.desktop_online, self.mobile_online) {
            (true, true) => "Both devices paired",
            (true, false) => "Desktop online, waiting for mobile",
            (false, true) => "Mobile online, waiting for desktop",
            (false, false) => "No devices online",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes() {
        for role in [DeviceRole::Unknown, DeviceRole::Desktop, DeviceRole::Mobile] {
            assert_eq!(DeviceRole::from_code(role.code()), Ok(role));
        }
        assert_eq!(DeviceRole::from_code(7), Err(ProtocolError::InvalidRole(7)));
        assert_eq!(DeviceRole::Unknown.code(), 0);
        assert_eq!(DeviceRole::Desktop.code(), 1);
        assert_eq!(DeviceRole::Mobile.code(), 2);
    }

    #[test]
    fn test_role_order_is_delivery_order() {
        let mut roles = vec![DeviceRole::Unknown, DeviceRole::Mobile, DeviceRole::Desktop];
        roles.sort();
        assert_eq!(roles, vec![DeviceRole::Desktop, DeviceRole::Mobile, DeviceRole::Unknown]);
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(PairingInfo::new(true, true).status_message(), "Both devices paired");
        assert_eq!(
            PairingInfo::new(true, false).status_message(),
            "Desktop online, waiting for mobile"
        );
        assert_eq!(
            PairingInfo::new(false, true).status_message(),
            "Mobile online, waiting for desktop"
        );
        assert_eq!(PairingInfo::default().status_message(), "No devices online");
    }

    #[test]
    fn test_is_paired() {
        assert!(PairingInfo::new(true, true).is_paired());
        assert!(!PairingInfo::new(true, false).is_paired());
        assert!(!PairingInfo::new(false, true).is_paired());
    }

    #[test]
    fn test_control_packet() {
        let packet = Packet::control("u1", DeviceRole::Mobile, ControlMessage::ack("hello"));

        assert_eq!(packet.source, DeviceRole::Unknown);
        assert_eq!(packet.destination, DeviceRole::Mobile);
        assert_eq!(packet.kind(), PacketKind::Control);
        assert_eq!(packet.control_message().unwrap().kind, ControlKind::Ack);
        assert!(packet.data_bytes().is_none());
        assert!(!packet.id.is_empty());
    }

    #[test]
    fn test_packet_ids_unique() {
        let a = Packet::data("u1", DeviceRole::Desktop, DeviceRole::Mobile, Bytes::new());
        let b = Packet::data("u1", DeviceRole::Desktop, DeviceRole::Mobile, Bytes::new());
        assert_ne!(a.id, b.id);
    }
}
