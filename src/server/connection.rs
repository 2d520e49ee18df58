//! Per-connection frame loop
//!
//! Reads frames until end of stream or the first fatal error. Packet frames
//! drive the [`StreamSession`]; request frames are answered in place.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use super::config::ServerConfig;
use super::writer::ConnectionWriter;
use crate::error::{Error, Result};
use crate::identity::IdentityVerifier;
use crate::pairing::PairingService;
use crate::protocol::{AuthenticateRequest, AuthenticateResponse, Frame, FrameDecoder, FrameReader};
use crate::router::PacketRouter;
use crate::session::StreamSession;

/// One accepted client connection
pub struct Connection<R, W, I> {
    session_id: u64,
    peer_addr: SocketAddr,
    reader: FrameReader<R>,
    writer: Arc<ConnectionWriter<W>>,
    session: StreamSession,
    pairing: PairingService,
    identity: Arc<I>,
}

impl<R, W, I> Connection<R, W, I>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    I: IdentityVerifier,
{
    pub fn new(
        session_id: u64,
        reader: R,
        writer: W,
        peer_addr: SocketAddr,
        config: &ServerConfig,
        router: PacketRouter,
        identity: Arc<I>,
    ) -> Self {
        let writer = Arc::new(ConnectionWriter::new(
            session_id,
            writer,
            config.write_buffer_size,
        ));
        let decoder = FrameDecoder::with_max_frame_size(config.max_frame_size);

        Self {
            session_id,
            peer_addr,
            reader: FrameReader::with_decoder(reader, decoder, config.read_buffer_size),
            session: StreamSession::new(writer.clone(), router.clone()),
            pairing: PairingService::new(Arc::clone(router.registry())),
            writer,
            identity,
        }
    }

    /// Run until the client disconnects or the session fails
    ///
    /// Always leaves the session closed and unregistered.
    pub async fn run(&mut self) -> Result<()> {
        let result = self.read_loop().await;

        self.session.close().await;
        self.writer.shutdown().await;

        result
    }

    async fn read_loop(&mut self) -> Result<()> {
        loop {
            let frame = match self.reader.read_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!(
                        session_id = self.session_id,
                        peer = %self.peer_addr,
                        user = ?self.session.state().user(),
                        "Client closed stream"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = self.session_id,
                        error = %e,
                        "Error receiving frame"
                    );
                    return Err(e);
                }
            };

            self.dispatch(frame).await?;
        }
    }

    async fn dispatch(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::Packet(packet) => self.session.handle_packet(packet).await,
            Frame::RegisterRequest(req) => {
                let resp = self.pairing.register_device(&req).await;
                self.reply(Frame::RegisterResponse(resp)).await
            }
            Frame::PairingStatusRequest(req) => {
                let resp = self.pairing.pairing_status(&req).await;
                self.reply(Frame::PairingStatusResponse(resp)).await
            }
            Frame::AuthenticateRequest(req) => {
                let resp = self.authenticate(&req).await;
                self.reply(Frame::AuthenticateResponse(resp)).await
            }
            other => {
                tracing::warn!(
                    session_id = self.session_id,
                    frame = other.name(),
                    "Client sent a server-only frame"
                );
                Err(Error::UnexpectedFrame(other.name()))
            }
        }
    }

    async fn authenticate(&self, req: &AuthenticateRequest) -> AuthenticateResponse {
        match self.identity.verify(&req.credential).await {
            Ok(user_id) => {
                tracing::debug!(session_id = self.session_id, user = %user_id, "Authenticated");
                AuthenticateResponse {
                    success: true,
                    user_id,
                    error_message: String::new(),
                }
            }
            Err(e) => {
                tracing::info!(session_id = self.session_id, error = %e, "Authentication failed");
                AuthenticateResponse {
                    success: false,
                    user_id: String::new(),
                    error_message: e.to_string(),
                }
            }
        }
    }

    async fn reply(&self, frame: Frame) -> Result<()> {
        self.writer.send_frame(&frame).await?;
        Ok(())
    }
}
