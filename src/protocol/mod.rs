//! Relay wire protocol
//!
//! Packets and one-shot request/response messages travel as length-prefixed
//! binary frames. See [`codec`] for the byte layout.

pub mod codec;
pub mod constants;
pub mod message;
pub mod packet;
pub mod stream;

pub use codec::{encode_frame, FrameDecoder};
pub use message::{
    AuthenticateRequest, AuthenticateResponse, Frame, PairingStatusRequest,
    PairingStatusResponse, RegisterDeviceRequest, RegisterDeviceResponse,
};
pub use packet::{
    new_packet_id, new_session_id, ControlKind, ControlMessage, DeviceRole, Packet, PacketKind,
    PairingInfo, Payload,
};
pub use stream::{FrameReader, FrameWriter};
