//! Frame encoder and decoder
//!
//! Frame layout:
//! ```text
//! +----------------+---------+------------------------+
//! | length: u32 BE | type u8 | type-specific fields   |
//! +----------------+---------+------------------------+
//!                  |<------------ length ------------>|
//! ```
//!
//! Field encodings:
//! - string: u16 BE length + UTF-8 bytes
//! - blob:   u32 BE length + raw bytes
//! - bool:   one byte, non-zero is true
//! - role / kind codes: one byte (see [`super::constants`])

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::constants::*;
use super::message::*;
use super::packet::{ControlKind, ControlMessage, DeviceRole, Packet, PairingInfo, Payload};
use crate::error::ProtocolError;

/// Incremental frame decoder
///
/// Feed it the connection's read buffer; it consumes one complete frame at a
/// time and leaves partial frames in place.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_frame_size: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Decode the next frame from `buf`
    ///
    /// Returns `Ok(None)` if more bytes are needed.
    pub fn decode(&self, buf: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        if len == 0 {
            return Err(ProtocolError::EmptyFrame);
        }
        if len > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge {
                size: len,
                max: self.max_frame_size,
            });
        }

        let total = FRAME_HEADER_SIZE + len;
        if buf.len() < total {
            buf.reserve(total - buf.len());
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let mut body = buf.split_to(len).freeze();
        let frame = decode_body(&mut body)?;

        if body.has_remaining() {
            return Err(ProtocolError::TrailingBytes(body.remaining()));
        }

        Ok(Some(frame))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Append one encoded frame (length prefix included) to `buf`
///
/// On error `buf` is left as it was.
pub fn encode_frame(frame: &Frame, buf: &mut BytesMut) -> Result<(), ProtocolError> {
    let start = buf.len();
    buf.put_u32(0); // patched below
    buf.put_u8(frame.frame_type());

    if let Err(e) = encode_fields(frame, buf) {
        buf.truncate(start);
        return Err(e);
    }

    let body_len = (buf.len() - start - FRAME_HEADER_SIZE) as u32;
    buf[start..start + FRAME_HEADER_SIZE].copy_from_slice(&body_len.to_be_bytes());
    Ok(())
}

fn encode_fields(frame: &Frame, buf: &mut BytesMut) -> Result<(), ProtocolError> {
    match frame {
        Frame::Packet(packet) => encode_packet(packet, buf)?,
        Frame::RegisterRequest(req) => {
            put_string(buf, &req.user)?;
            buf.put_u8(req.role.code());
        }
        Frame::RegisterResponse(resp) => {
            put_bool(buf, resp.success);
            put_string(buf, &resp.session_id)?;
            put_pairing_info(buf, &resp.pairing_info);
        }
        Frame::PairingStatusRequest(req) => {
            put_string(buf, &req.user)?;
        }
        Frame::PairingStatusResponse(resp) => {
            put_bool(buf, resp.paired);
            put_pairing_info(buf, &resp.pairing_info);
        }
        Frame::AuthenticateRequest(req) => {
            put_string(buf, &req.credential)?;
        }
        Frame::AuthenticateResponse(resp) => {
            put_bool(buf, resp.success);
            put_string(buf, &resp.user_id)?;
            put_string(buf, &resp.error_message)?;
        }
    }
    Ok(())
}

fn encode_packet(packet: &Packet, buf: &mut BytesMut) -> Result<(), ProtocolError> {
    put_string(buf, &packet.id)?;
    put_string(buf, &packet.user)?;
    buf.put_u8(packet.source.code());
    buf.put_u8(packet.destination.code());

    match &packet.payload {
        Payload::Data(data) => {
            buf.put_u8(KIND_DATA);
            buf.put_u32(data.len() as u32);
            buf.put_slice(data);
        }
        Payload::Control(msg) => {
            buf.put_u8(KIND_CONTROL);
            buf.put_u8(msg.kind.code());
            put_string(buf, &msg.text)?;
        }
    }
    Ok(())
}

fn decode_body(buf: &mut Bytes) -> Result<Frame, ProtocolError> {
    if buf.is_empty() {
        return Err(ProtocolError::EmptyFrame);
    }

    let frame_type = buf.get_u8();
    let frame = match frame_type {
        FRAME_PACKET => Frame::Packet(decode_packet(buf)?),
        FRAME_REGISTER_REQUEST => Frame::RegisterRequest(RegisterDeviceRequest {
            user: get_string(buf)?,
            role: DeviceRole::from_code(get_u8(buf)?)?,
        }),
        FRAME_REGISTER_RESPONSE => Frame::RegisterResponse(RegisterDeviceResponse {
            success: get_bool(buf)?,
            session_id: get_string(buf)?,
            pairing_info: get_pairing_info(buf)?,
        }),
        FRAME_PAIRING_STATUS_REQUEST => Frame::PairingStatusRequest(PairingStatusRequest {
            user: get_string(buf)?,
        }),
        FRAME_PAIRING_STATUS_RESPONSE => Frame::PairingStatusResponse(PairingStatusResponse {
            paired: get_bool(buf)?,
            pairing_info: get_pairing_info(buf)?,
        }),
        FRAME_AUTHENTICATE_REQUEST => Frame::AuthenticateRequest(AuthenticateRequest {
            credential: get_string(buf)?,
        }),
        FRAME_AUTHENTICATE_RESPONSE => Frame::AuthenticateResponse(AuthenticateResponse {
            success: get_bool(buf)?,
            user_id: get_string(buf)?,
            error_message: get_string(buf)?,
        }),
        other => return Err(ProtocolError::UnknownFrameType(other)),
    };

    Ok(frame)
}

fn decode_packet(buf: &mut Bytes) -> Result<Packet, ProtocolError> {
    let id = get_string(buf)?;
    let user = get_string(buf)?;
    let source = DeviceRole::from_code(get_u8(buf)?)?;
    let destination = DeviceRole::from_code(get_u8(buf)?)?;

    let payload = match get_u8(buf)? {
        KIND_DATA => {
            let len = get_u32(buf)? as usize;
            if buf.remaining() < len {
                return Err(ProtocolError::UnexpectedEof);
            }
            Payload::Data(buf.split_to(len))
        }
        KIND_CONTROL => {
            let kind = ControlKind::from_code(get_u8(buf)?)?;
            let text = get_string(buf)?;
            Payload::Control(ControlMessage { kind, text })
        }
        other => return Err(ProtocolError::InvalidPacketKind(other)),
    };

    Ok(Packet {
        id,
        user,
        source,
        destination,
        payload,
    })
}

fn put_string(buf: &mut BytesMut, s: &str) -> Result<(), ProtocolError> {
    if s.len() > u16::MAX as usize {
        return Err(ProtocolError::StringTooLong(s.len()));
    }
    buf.put_u16(s.len() as u16);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn put_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(value as u8);
}

fn put_pairing_info(buf: &mut BytesMut, info: &PairingInfo) {
    put_bool(buf, info.desktop_online);
    put_bool(buf, info.mobile_online);
}

fn get_u8(buf: &mut Bytes) -> Result<u8, ProtocolError> {
    if buf.is_empty() {
        return Err(ProtocolError::UnexpectedEof);
    }
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut Bytes) -> Result<u32, ProtocolError> {
    if buf.remaining() < 4 {
        return Err(ProtocolError::UnexpectedEof);
    }
    Ok(buf.get_u32())
}

fn get_bool(buf: &mut Bytes) -> Result<bool, ProtocolError> {
    Ok(get_u8(buf)? != 0)
}

fn get_string(buf: &mut Bytes) -> Result<String, ProtocolError> {
    if buf.remaining() < 2 {
        return Err(ProtocolError::UnexpectedEof);
    }
    let len = buf.get_u16() as usize;
    if buf.remaining() < len {
        return Err(ProtocolError::UnexpectedEof);
    }
    let bytes = buf.split_to(len);
    String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
}

fn get_pairing_info(buf: &mut Bytes) -> Result<PairingInfo, ProtocolError> {
    Ok(PairingInfo {
        desktop_online: get_bool(buf)?,
        mobile_online: get_bool(buf)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(frame: &Frame) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_frame(frame, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_data_packet_layout() {
        let packet = Packet {
            id: "p".into(),
            user: "u1".into(),
            source: DeviceRole::Mobile,
            destination: DeviceRole::Desktop,
            payload: Payload::Data(Bytes::from_static(b"hi")),
        };
        let buf = encode(&Frame::Packet(packet));

        let expected: &[u8] = &[
            0, 0, 0, 17, // length
            FRAME_PACKET,
            0, 1, b'p', // id
            0, 2, b'u', b'1', // user
            ROLE_MOBILE,
            ROLE_DESKTOP,
            KIND_DATA,
            0, 0, 0, 2, b'h', b'i',
        ];
        assert_eq!(&buf[..], expected);
    }

    #[test]
    fn test_decode_control_packet() {
        let packet = Packet::control("u1", DeviceRole::Desktop, ControlMessage::error("nope"));
        let mut buf = encode(&Frame::Packet(packet.clone()));

        let frame = FrameDecoder::new().decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame, Frame::Packet(packet));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_frame() {
        let full = encode(&Frame::PairingStatusRequest(PairingStatusRequest {
            user: "someone".into(),
        }));
        let decoder = FrameDecoder::new();

        let mut buf = BytesMut::from(&full[..6]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 6); // nothing consumed

        buf.extend_from_slice(&full[6..]);
        let frame = decoder.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(frame, Frame::PairingStatusRequest(req) if req.user == "someone"));
    }

    #[test]
    fn test_decode_two_frames_in_one_buffer() {
        let mut buf = encode(&Frame::AuthenticateRequest(AuthenticateRequest {
            credential: "token".into(),
        }));
        buf.extend_from_slice(&encode(&Frame::PairingStatusResponse(PairingStatusResponse {
            paired: true,
            pairing_info: PairingInfo::new(true, true),
        })));

        let decoder = FrameDecoder::new();
        assert!(matches!(
            decoder.decode(&mut buf).unwrap(),
            Some(Frame::AuthenticateRequest(_))
        ));
        assert!(matches!(
            decoder.decode(&mut buf).unwrap(),
            Some(Frame::PairingStatusResponse(resp)) if resp.paired
        ));
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_frame_too_large() {
        let mut buf = BytesMut::from(&[0u8, 0, 1, 0, FRAME_PACKET][..]);
        let result = FrameDecoder::with_max_frame_size(64).decode(&mut buf);
        assert_eq!(
            result,
            Err(ProtocolError::FrameTooLarge { size: 256, max: 64 })
        );
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut buf = BytesMut::from(&[0u8, 0, 0, 0][..]);
        assert_eq!(FrameDecoder::new().decode(&mut buf), Err(ProtocolError::EmptyFrame));
    }

    #[test]
    fn test_unknown_frame_type() {
        let mut buf = BytesMut::from(&[0u8, 0, 0, 1, 0x7f][..]);
        assert_eq!(
            FrameDecoder::new().decode(&mut buf),
            Err(ProtocolError::UnknownFrameType(0x7f))
        );
    }

    #[test]
    fn test_invalid_role() {
        let bytes = [0u8, 0, 0, 5, FRAME_REGISTER_REQUEST, 0, 1, b'u', 9];
        let mut buf = BytesMut::from(&bytes[..]);
        assert_eq!(
            FrameDecoder::new().decode(&mut buf),
            Err(ProtocolError::InvalidRole(9))
        );
    }

    #[test]
    fn test_truncated_body() {
        // Declared string length runs past the end of the frame
        let mut buf = BytesMut::from(&[0u8, 0, 0, 3, FRAME_PAIRING_STATUS_REQUEST, 0, 9][..]);
        assert_eq!(
            FrameDecoder::new().decode(&mut buf),
            Err(ProtocolError::UnexpectedEof)
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let bytes = [0u8, 0, 0, 5, FRAME_PAIRING_STATUS_REQUEST, 0, 1, b'u', 0xff];
        let mut buf = BytesMut::from(&bytes[..]);
        assert_eq!(
            FrameDecoder::new().decode(&mut buf),
            Err(ProtocolError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [0u8, 0, 0, 4, FRAME_PAIRING_STATUS_REQUEST, 0, 1, 0xff];
        let mut buf = BytesMut::from(&bytes[..]);
        assert_eq!(FrameDecoder::new().decode(&mut buf), Err(ProtocolError::InvalidUtf8));
    }

    #[test]
    fn test_string_too_long() {
        let frame = Frame::PairingStatusRequest(PairingStatusRequest {
            user: "x".repeat(70_000),
        });
        let mut buf = BytesMut::new();
        assert_eq!(
            encode_frame(&frame, &mut buf),
            Err(ProtocolError::StringTooLong(70_000))
        );
        assert!(buf.is_empty());
    }
}
