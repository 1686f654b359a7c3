use std::sync::Arc;

use bytes::BytesMut;
use linkframe_transport::Transport;
use tracing::trace;

use crate::codec::{encode_frame, MAX_FRAME_SIZE};
use crate::crc::ChecksumTable;
use crate::error::Result;

/// Frames payloads and hands them to a transport.
///
/// The writer owns only its scratch buffer and checksum table; the transport
/// is borrowed per call so the same link can also be read from.
#[derive(Debug)]
pub struct FrameWriter {
    buf: BytesMut,
    table: Arc<ChecksumTable>,
}

impl FrameWriter {
    /// Create a writer using the default shared checksum table.
    pub fn new() -> Self {
        Self::with_table(ChecksumTable::shared())
    }

    /// Create a writer with an explicit checksum table.
    pub fn with_table(table: Arc<ChecksumTable>) -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
            table,
        }
    }

    /// Frame the first `len` bytes of `payload` and write the frame.
    ///
    /// `payload` is stuffed in place. Framing cannot fail once `len` is
    /// clamped, so the only error source is the transport. Returns the
    /// payload length actually sent.
    pub fn send<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        id: u8,
        payload: &mut [u8],
        len: usize,
    ) -> Result<usize> {
        self.buf.clear();
        let len = encode_frame(&self.table, id, payload, len, &mut self.buf);
        trace!(id, len, "sending frame");
        transport.write_all(&self.buf)?;
        Ok(len)
    }

    /// The checksum table used for outgoing frames.
    pub fn table(&self) -> &Arc<ChecksumTable> {
        &self.table
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use linkframe_transport::{MemoryTransport, TransportError};

    use super::*;
    use crate::codec::{START_BYTE, STOP_BYTE};
    use crate::error::FrameError;

    #[test]
    fn write_single_frame() {
        let mut transport = MemoryTransport::new();
        let mut writer = FrameWriter::new();
        let mut payload = [1, 2, 3, 4, 5];

        let sent = writer.send(&mut transport, 0, &mut payload, 5).unwrap();

        assert_eq!(sent, 5);
        assert_eq!(
            transport.take_written().as_ref(),
            &[0x7E, 0x00, 0xFF, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05, 0x80, 0x81]
        );
    }

    #[test]
    fn write_multiple_frames() {
        let mut transport = MemoryTransport::new();
        let mut writer = FrameWriter::new();

        writer.send(&mut transport, 1, &mut [0xAA], 1).unwrap();
        writer.send(&mut transport, 2, &mut [0xBB, 0xCC], 2).unwrap();

        let wire = transport.take_written();
        assert_eq!(wire.len(), 7 + 8);
        assert_eq!(&wire[..2], &[START_BYTE, 1]);
        assert_eq!(wire[6], STOP_BYTE);
        assert_eq!(&wire[7..9], &[START_BYTE, 2]);
    }

    #[test]
    fn zero_length_send_still_frames() {
        let mut transport = MemoryTransport::new();
        let mut writer = FrameWriter::new();

        let sent = writer.send(&mut transport, 4, &mut [], 0).unwrap();

        assert_eq!(sent, 0);
        assert_eq!(
            transport.take_written().as_ref(),
            &[START_BYTE, 4, 0xFF, 0, 0, STOP_BYTE]
        );
    }

    #[test]
    fn transport_failure_is_propagated() {
        let (mut left, right) = MemoryTransport::pair();
        drop(right);
        let mut writer = FrameWriter::new();

        let err = writer.send(&mut left, 1, &mut [1], 1).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Closed)
        ));
    }

    #[test]
    fn custom_table_is_used() {
        let table = Arc::new(ChecksumTable::new(0x07, 8).unwrap());
        let mut transport = MemoryTransport::new();
        let mut writer = FrameWriter::with_table(Arc::clone(&table));

        writer.send(&mut transport, 0, &mut [1, 2, 3], 3).unwrap();

        let wire = transport.take_written();
        assert_eq!(wire[7], table.checksum(&[1, 2, 3]));
    }
}
