//! Frame-level messages
//!
//! A connection carries a sequence of [`Frame`]s. Packet frames drive the
//! stream session; the request/response frames are one-shot calls answered
//! on the same connection.

use super::constants::*;
use super::packet::{DeviceRole, Packet, PairingInfo};

/// One-shot device registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDeviceRequest {
    pub user: String,
    pub role: DeviceRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDeviceResponse {
    pub success: bool,
    /// Fresh opaque ID, unrelated to streaming registration
    pub session_id: String,
    pub pairing_info: PairingInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingStatusRequest {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingStatusResponse {
    pub paired: bool,
    pub pairing_info: PairingInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateRequest {
    pub credential: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateResponse {
    pub success: bool,
    pub user_id: String,
    pub error_message: String,
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Packet(Packet),
    RegisterRequest(RegisterDeviceRequest),
    RegisterResponse(RegisterDeviceResponse),
    PairingStatusRequest(PairingStatusRequest),
    PairingStatusResponse(PairingStatusResponse),
    AuthenticateRequest(AuthenticateRequest),
    AuthenticateResponse(AuthenticateResponse),
}

impl Frame {
    /// Frame type byte
    pub fn frame_type(&self) -> u8 {
        match self {
            Frame::Packet(_) => FRAME_PACKET,
            Frame::RegisterRequest(_) => FRAME_REGISTER_REQUEST,
            Frame::RegisterResponse(_) => FRAME_REGISTER_RESPONSE,
            Frame::PairingStatusRequest(_) => FRAME_PAIRING_STATUS_REQUEST,
            Frame::PairingStatusResponse(_) => FRAME_PAIRING_STATUS_RESPONSE,
            Frame::AuthenticateRequest(_) => FRAME_AUTHENTICATE_REQUEST,
            Frame::AuthenticateResponse(_) => FRAME_AUTHENTICATE_RESPONSE,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Frame::Packet(_) => "Packet",
            Frame::RegisterRequest(_) => "RegisterDevice",
            Frame::RegisterResponse(_) => "RegisterDeviceResponse",
            Frame::PairingStatusRequest(_) => "GetPairingStatus",
            Frame::PairingStatusResponse(_) => "PairingStatusResponse",
            Frame::AuthenticateRequest(_) => "Authenticate",
            Frame::AuthenticateResponse(_) => "AuthenticateResponse",
        }
    }
}

impl From<Packet> for Frame {
    fn from(packet: Packet) -> Self {
        Frame::Packet(packet)
    }
}
