use std::io::{ErrorKind, Read, Write};

use serialport::SerialPort;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Serial-port transport backed by the `serialport` crate.
///
/// The port must already be open; enumerating and opening devices is left
/// to the caller. A short read timeout on the port keeps
/// [`read_available`](Transport::read_available) from stalling.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Wrap an opened serial port.
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        debug!(port = ?port.name(), "serial transport attached");
        Self { port }
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match Read::read(&mut self.port, buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::TimedOut
                        || err.kind() == ErrorKind::WouldBlock =>
                {
                    return Ok(0)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        Write::write_all(&mut self.port, bytes)?;
        loop {
            match Write::flush(&mut self.port) {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .finish()
    }
}
