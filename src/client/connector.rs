//! Relay client connection
//!
//! Thin client over one TCP connection: a device stream plus the unary
//! requests, which may be issued on the same connection.

use std::collections::VecDeque;

use bytes::Bytes;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::{Error, Result};
use crate::identity::IdentityError;
use crate::protocol::{
    AuthenticateRequest, AuthenticateResponse, ControlMessage, DeviceRole, Frame, FrameReader,
    FrameWriter, Packet, PairingStatusRequest, PairingStatusResponse, RegisterDeviceRequest,
    RegisterDeviceResponse,
};

/// Relay client
///
/// # Example
/// ```no_run
/// use bytes::Bytes;
/// use pairing_relay::client::RelayClient;
/// use pairing_relay::protocol::DeviceRole;
///
/// # async fn example() -> pairing_relay::error::Result<()> {
/// let mut client = RelayClient::connect("127.0.0.1:50051").await?;
///
/// let ack = client.identify("user-1", DeviceRole::Mobile).await?;
/// println!("{}", ack.text);
///
/// client
///     .send_data("user-1", DeviceRole::Mobile, DeviceRole::Desktop, Bytes::from_static(b"hi"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RelayClient {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    /// Packets that arrived while waiting for a unary response
    pending: VecDeque<Packet>,
}

impl RelayClient {
    /// Connect to a relay server
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let socket = TcpStream::connect(addr).await?;
        socket.set_nodelay(true)?;
        let (reader, writer) = socket.into_split();

        Ok(Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
            pending: VecDeque::new(),
        })
    }

    /// Send a packet on the stream
    pub async fn send_packet(&mut self, packet: Packet) -> Result<()> {
        self.writer.write_frame(&packet.into()).await
    }

    /// Send a DATA packet
    pub async fn send_data(
        &mut self,
        user: &str,
        source: DeviceRole,
        destination: DeviceRole,
        data: Bytes,
    ) -> Result<()> {
        self.send_packet(Packet::data(user, source, destination, data))
            .await
    }

    /// Open the stream as (user, role)
    ///
    /// Sends an empty DATA packet and waits for the relay's pairing ACK.
    /// The peer may already route data to this device before the ACK is
    /// written; those packets are kept for [`RelayClient::recv_packet`].
    pub async fn identify(&mut self, user: &str, role: DeviceRole) -> Result<ControlMessage> {
        self.send_data(user, role, DeviceRole::Unknown, Bytes::new())
            .await?;

        loop {
            match self.reader.read_frame().await?.ok_or_else(closed)? {
                Frame::Packet(packet) => match packet.control_message() {
                    Some(msg) => return Ok(msg.clone()),
                    None => self.pending.push_back(packet),
                },
                other => return Err(Error::UnexpectedFrame(other.name())),
            }
        }
    }

    /// Receive the next packet, or `None` once the server closes the stream
    pub async fn recv_packet(&mut self) -> Result<Option<Packet>> {
        if let Some(packet) = self.pending.pop_front() {
            return Ok(Some(packet));
        }

        match self.reader.read_frame().await? {
            Some(Frame::Packet(packet)) => Ok(Some(packet)),
            Some(other) => Err(Error::UnexpectedFrame(other.name())),
            None => Ok(None),
        }
    }

    pub async fn register_device(
        &mut self,
        user: &str,
        role: DeviceRole,
    ) -> Result<RegisterDeviceResponse> {
        let request = Frame::RegisterRequest(RegisterDeviceRequest {
            user: user.to_string(),
            role,
        });
        match self.call(request).await? {
            Frame::RegisterResponse(resp) => Ok(resp),
            other => Err(Error::UnexpectedFrame(other.name())),
        }
    }

    pub async fn pairing_status(&mut self, user: &str) -> Result<PairingStatusResponse> {
        let request = Frame::PairingStatusRequest(PairingStatusRequest {
            user: user.to_string(),
        });
        match self.call(request).await? {
            Frame::PairingStatusResponse(resp) => Ok(resp),
            other => Err(Error::UnexpectedFrame(other.name())),
        }
    }

    pub async fn authenticate(&mut self, credential: &str) -> Result<AuthenticateResponse> {
        let request = Frame::AuthenticateRequest(AuthenticateRequest {
            credential: credential.to_string(),
        });
        match self.call(request).await? {
            Frame::AuthenticateResponse(resp) => Ok(resp),
            other => Err(Error::UnexpectedFrame(other.name())),
        }
    }

    /// Authenticate and return the verified user ID
    pub async fn login(&mut self, credential: &str) -> Result<String> {
        let resp = self.authenticate(credential).await?;
        if resp.success {
            Ok(resp.user_id)
        } else {
            Err(Error::Identity(IdentityError::Rejected(resp.error_message)))
        }
    }

    /// Close the write direction; the server unregisters the stream
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    /// Write a request and wait for the first non-packet frame
    async fn call(&mut self, request: Frame) -> Result<Frame> {
        self.writer.write_frame(&request).await?;

        loop {
            match self.reader.read_frame().await?.ok_or_else(closed)? {
                Frame::Packet(packet) => self.pending.push_back(packet),
                response => return Ok(response),
            }
        }
    }
}

fn closed() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "relay closed the connection",
    ))
}
