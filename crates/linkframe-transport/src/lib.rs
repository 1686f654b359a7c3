//! Byte-pipe transport abstraction for serial links.
//!
//! A link needs only three things from whatever carries its bytes:
//! - how many bytes can be read right now
//! - read up to N of those bytes without blocking for more
//! - write a whole buffer
//!
//! This is the lowest layer of linkframe. Everything else builds on top of
//! the [`Transport`] trait provided here.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use traits::Transport;

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
