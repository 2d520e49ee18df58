//! Wire protocol constants

/// Size of the big-endian length prefix in front of every frame body
pub const FRAME_HEADER_SIZE: usize = 4;

/// Default upper bound on a single frame body (4MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Default port, matching the deployed relay
pub const DEFAULT_PORT: u16 = 50051;

// Frame types
pub const FRAME_PACKET: u8 = 0x01;
pub const FRAME_REGISTER_REQUEST: u8 = 0x10;
pub const FRAME_REGISTER_RESPONSE: u8 = 0x11;
pub const FRAME_PAIRING_STATUS_REQUEST: u8 = 0x12;
pub const FRAME_PAIRING_STATUS_RESPONSE: u8 = 0x13;
pub const FRAME_AUTHENTICATE_REQUEST: u8 = 0x14;
pub const FRAME_AUTHENTICATE_RESPONSE: u8 = 0x15;

// Device roles
pub const ROLE_UNKNOWN: u8 = 0;
pub const ROLE_DESKTOP: u8 = 1;
pub const ROLE_MOBILE: u8 = 2;

// Packet kinds
pub const KIND_DATA: u8 = 0;
pub const KIND_CONTROL: u8 = 1;

// Control kinds
pub const CONTROL_ACK: u8 = 0;
pub const CONTROL_ERROR: u8 = 1;
