//! Send side of a server connection
//!
//! The write half is wrapped in a mutex so the session's own replies and
//! packets routed in from the peer's session never interleave on the wire.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::protocol::{Frame, FrameWriter, Packet};
use crate::registry::{PacketSink, SendError};

/// Serialized writer for one connection; registered as its stream handle
pub struct ConnectionWriter<W> {
    id: u64,
    writer: Mutex<FrameWriter<W>>,
    closed: AtomicBool,
}

impl<W: AsyncWrite + Unpin + Send + 'static> ConnectionWriter<W> {
    pub fn new(id: u64, writer: W, capacity: usize) -> Self {
        Self {
            id,
            writer: Mutex::new(FrameWriter::with_capacity(writer, capacity)),
            closed: AtomicBool::new(false),
        }
    }

    /// Write one frame
    ///
    /// A failed write marks the writer closed; later sends fail fast.
    pub async fn send_frame(&self, frame: &Frame) -> Result<(), SendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SendError::Closed);
        }

        let mut writer = self.writer.lock().await;
        match writer.write_frame(frame).await {
            Ok(()) => Ok(()),
            Err(Error::Protocol(e)) => Err(SendError::Encode(e)),
            Err(Error::Io(e)) => {
                self.closed.store(true, Ordering::Release);
                Err(SendError::Io(e))
            }
            Err(_) => {
                self.closed.store(true, Ordering::Release);
                Err(SendError::Closed)
            }
        }
    }

    /// Shut down the write direction; subsequent sends return `Closed`
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::debug!(connection = self.id, error = %e, "Shutdown failed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> PacketSink for ConnectionWriter<W> {
    fn id(&self) -> u64 {
        self.id
    }

    async fn send(&self, packet: &Packet) -> Result<(), SendError> {
        self.send_frame(&Frame::from(packet.clone())).await
    }
}
