//! Byte-stuffed, checksummed packet framing for serial links.
//!
//! Every packet travels as:
//! - a start marker (`0x7E`), a packet id, an overhead byte and a length
//! - the payload, with every start-marker value stuffed out of it
//! - an 8-bit table-driven checksum of the stuffed payload and a stop marker (`0x81`)
//!
//! [`FrameWriter`] produces frames, [`FrameParser`] reassembles them one byte
//! at a time from whatever a [`linkframe_transport::Transport`] has ready.

pub mod codec;
pub mod crc;
pub mod error;
pub mod parser;
pub mod stuffing;
pub mod writer;

pub use codec::{
    encode_frame, encode_packet, FrameConfig, PayloadBuffer, HEADER_SIZE, MAX_FRAME_SIZE,
    MAX_PAYLOAD, NO_SENTINEL, START_BYTE, STOP_BYTE, TRAILER_SIZE,
};
pub use crc::{ChecksumByte, ChecksumTable, DEFAULT_POLYNOMIAL, DEFAULT_TABLE_WIDTH};
pub use error::{FrameError, Result};
pub use parser::{FrameParser, ParserState, Status};
pub use writer::FrameWriter;
