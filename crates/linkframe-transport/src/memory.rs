use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

type Pipe = Arc<Mutex<BytesMut>>;

/// In-memory byte pipe.
///
/// A standalone transport (from [`MemoryTransport::new`]) reads bytes pushed
/// with [`inject`](MemoryTransport::inject) and collects everything written
/// for [`take_written`](MemoryTransport::take_written). Two ends created by
/// [`MemoryTransport::pair`] are cross-connected: bytes written on one end
/// become readable on the other.
#[derive(Debug)]
pub struct MemoryTransport {
    inbound: Pipe,
    outbound: Pipe,
    paired: bool,
}

impl MemoryTransport {
    /// Create an unconnected transport.
    pub fn new() -> Self {
        Self {
            inbound: Pipe::default(),
            outbound: Pipe::default(),
            paired: false,
        }
    }

    /// Create two connected ends of a duplex link.
    pub fn pair() -> (Self, Self) {
        let left_to_right = Pipe::default();
        let right_to_left = Pipe::default();
        let left = Self {
            inbound: Arc::clone(&right_to_left),
            outbound: Arc::clone(&left_to_right),
            paired: true,
        };
        let right = Self {
            inbound: left_to_right,
            outbound: right_to_left,
            paired: true,
        };
        (left, right)
    }

    /// Make `bytes` readable on this end, as if they had arrived on the wire.
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.inbound).extend_from_slice(bytes);
    }

    /// Drain everything written on this end that has not been read yet.
    pub fn take_written(&self) -> Bytes {
        lock(&self.outbound).split().freeze()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(lock(&self.inbound).len())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut inbound = lock(&self.inbound);
        let n = inbound.len().min(buf.len());
        buf[..n].copy_from_slice(&inbound[..n]);
        inbound.advance(n);
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if self.paired && Arc::strong_count(&self.outbound) < 2 {
            return Err(TransportError::Closed);
        }
        trace!(len = bytes.len(), "memory transport write");
        lock(&self.outbound).extend_from_slice(bytes);
        Ok(())
    }
}

fn lock(pipe: &Pipe) -> MutexGuard<'_, BytesMut> {
    pipe.lock().unwrap_or_else(PoisonError::into_inner)
}
