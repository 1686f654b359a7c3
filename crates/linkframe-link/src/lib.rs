//! Packet link facade.
//!
//! A [`Link`] bundles the transmit and receive payload buffers, the framing
//! state and a packet-id dispatch table for one point-to-point connection.
//! Stage values with [`Link::write`], frame them with [`Link::send`], and poll
//! [`Link::tick`] to receive packets and run their handlers.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod link;
pub mod received;

pub use callbacks::{CallbackTable, PacketHandler, MAX_HANDLERS};
pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::Link;
pub use received::Received;
