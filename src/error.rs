//! Error types
//!
//! Crate-level error plus the wire protocol decode errors. Routing and
//! delivery errors live next to the registry in [`crate::registry::error`].

use std::fmt;
use std::io;

use crate::identity::IdentityError;
use crate::registry::SendError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Socket level failure
    Io(io::Error),
    /// Malformed or oversized frame
    Protocol(ProtocolError),
    /// Write to a stream handle failed
    Send(SendError),
    /// Credential rejected by the identity collaborator
    Identity(IdentityError),
    /// Peer sent something that is valid on the wire but not expected here
    UnexpectedFrame(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Send(e) => write!(f, "Send error: {}", e),
            Error::Identity(e) => write!(f, "Identity error: {}", e),
            Error::UnexpectedFrame(what) => write!(f, "Unexpected frame: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Protocol(e) => Some(e),
            Error::Send(e) => Some(e),
            Error::Identity(e) => Some(e),
            Error::UnexpectedFrame(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<SendError> for Error {
    fn from(e: SendError) -> Self {
        Error::Send(e)
    }
}

impl From<IdentityError> for Error {
    fn from(e: IdentityError) -> Self {
        Error::Identity(e)
    }
}

/// Wire protocol decode/encode errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame body ended before a field was complete
    UnexpectedEof,
    /// Declared frame length exceeds the configured limit
    FrameTooLarge { size: usize, max: usize },
    /// Zero-length frame (no type byte)
    EmptyFrame,
    /// Frame type byte not recognized
    UnknownFrameType(u8),
    /// Device role code not recognized
    InvalidRole(u8),
    /// Packet kind code not recognized
    InvalidPacketKind(u8),
    /// Control kind code not recognized
    InvalidControlKind(u8),
    /// String field is not valid UTF-8
    InvalidUtf8,
    /// String too long for its 16-bit length prefix
    StringTooLong(usize),
    /// Bytes left over after the frame was decoded
    TrailingBytes(usize),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnexpectedEof => write!(f, "unexpected end of frame"),
            ProtocolError::FrameTooLarge { size, max } => {
                write!(f, "frame of {} bytes exceeds limit of {}", size, max)
            }
            ProtocolError::EmptyFrame => write!(f, "empty frame"),
            ProtocolError::UnknownFrameType(t) => write!(f, "unknown frame type 0x{:02x}", t),
            ProtocolError::InvalidRole(r) => write!(f, "invalid device role {}", r),
            ProtocolError::InvalidPacketKind(k) => write!(f, "invalid packet kind {}", k),
            ProtocolError::InvalidControlKind(k) => write!(f, "invalid control kind {}", k),
            ProtocolError::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
            ProtocolError::StringTooLong(len) => write!(f, "string of {} bytes too long", len),
            ProtocolError::TrailingBytes(n) => write!(f, "{} trailing bytes after frame", n),
        }
    }
}

impl std::error::Error for ProtocolError {}
