//! Async frame reader and writer over a byte stream

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::codec::{encode_frame, FrameDecoder};
use super::message::Frame;
use crate::error::{Error, Result};

/// Reads whole frames from the read half of a connection
pub struct FrameReader<R> {
    reader: R,
    buffer: BytesMut,
    decoder: FrameDecoder,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_decoder(reader, FrameDecoder::new(), 8 * 1024)
    }

    pub fn with_decoder(reader: R, decoder: FrameDecoder, buffer_size: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(buffer_size),
            decoder,
        }
    }

    /// Read the next frame
    ///
    /// Returns `Ok(None)` on a clean end of stream (no partial frame pending).
    pub async fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }

            let n = self.reader.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-frame",
                )));
            }
        }
    }
}

/// Writes frames to the write half of a connection
pub struct FrameWriter<W> {
    writer: W,
    buffer: BytesMut,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, 8 * 1024)
    }

    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode and flush one frame
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buffer.clear();
        encode_frame(frame, &mut self.buffer)?;
        self.writer.write_all(&self.buffer).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Shut down the write direction
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio_test::io::Builder;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::protocol::message::PairingStatusRequest;
    use crate::protocol::packet::{DeviceRole, Packet};

    fn encoded(frame: &Frame) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(frame, &mut buf).unwrap();
        buf.to_vec()
    }

    #[tokio::test]
    async fn test_read_frame_split_across_reads() {
        let frame = Frame::Packet(Packet::data(
            "u1",
            DeviceRole::Mobile,
            DeviceRole::Desktop,
            Bytes::from_static(b"payload"),
        ));
        let bytes = encoded(&frame);
        let mock = Builder::new().read(&bytes[..3]).read(&bytes[3..10]).read(&bytes[10..]).build();

        let mut reader = FrameReader::new(mock);
        let read = assert_ok!(reader.read_frame().await);
        assert_eq!(read, Some(frame));
        assert_eq!(assert_ok!(reader.read_frame().await), None);
    }

    #[tokio::test]
    async fn test_read_eof_mid_frame() {
        let frame = Frame::PairingStatusRequest(PairingStatusRequest { user: "u1".into() });
        let bytes = encoded(&frame);
        let mock = Builder::new().read(&bytes[..bytes.len() - 1]).build();

        let mut reader = FrameReader::new(mock);
        assert_err!(reader.read_frame().await);
    }

    #[tokio::test]
    async fn test_read_malformed_frame() {
        let mock = Builder::new().read(&[0, 0, 0, 1, 0xee]).build();

        let mut reader = FrameReader::new(mock);
        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_write_frame() {
        let frame = Frame::PairingStatusRequest(PairingStatusRequest { user: "u1".into() });
        let mock = Builder::new().write(&encoded(&frame)).build();

        let mut writer = FrameWriter::new(mock);
        assert_ok!(writer.write_frame(&frame).await);
    }
}
