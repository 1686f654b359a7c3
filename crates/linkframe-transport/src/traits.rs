use crate::error::Result;

/// A raw, non-blocking byte pipe, typically a USB/UART serial port.
///
/// The transport knows nothing about framing. Implementations must never
/// block waiting for bytes that have not arrived yet: `read_available`
/// returns whatever is immediately ready, possibly nothing.
pub trait Transport {
    /// Number of bytes that can be read right now without blocking.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` bytes that are immediately available.
    ///
    /// Returns the number of bytes copied into `buf`, which may be fewer
    /// than requested (including zero).
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer to the link.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_available(buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_available(buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}
