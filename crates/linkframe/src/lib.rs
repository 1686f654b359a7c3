//! Packet framing and typed payloads for serial links.
//!
//! linkframe moves small structured packets over byte streams that have no
//! message boundaries of their own, such as a UART to a microcontroller.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte-pipe abstraction (in-memory pair, serial port behind `serial`)
//! - [`frame`]: Checksum table, start-byte stuffing, frame codec and receive state machine
//! - [`marshal`]: Typed values in payload buffers under a selectable byte order
//! - [`link`]: Link facade with callback dispatch (behind `link` feature)

/// Re-export transport types.
pub mod transport {
    pub use linkframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use linkframe_frame::*;
}

/// Re-export marshalling types.
pub mod marshal {
    pub use linkframe_marshal::*;
}

/// Re-export link types (requires `link` feature).
#[cfg(feature = "link")]
pub mod link {
    pub use linkframe_link::*;
}
