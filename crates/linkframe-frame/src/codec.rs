use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::crc::{ChecksumTable, DEFAULT_POLYNOMIAL, DEFAULT_TABLE_WIDTH};
use crate::error::Result;
use crate::stuffing::{compute_overhead, stuff};

/// Start-of-frame marker; also the value removed from payloads by stuffing.
pub const START_BYTE: u8 = 0x7E;

/// End-of-frame marker.
pub const STOP_BYTE: u8 = 0x81;

/// Maximum payload size in bytes.
pub const MAX_PAYLOAD: usize = 0xFE;

/// Overhead value meaning "no start byte in the payload".
pub const NO_SENTINEL: u8 = 0xFF;

/// Frame header: start (1) + id (1) + overhead (1) + length (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Frame trailer: checksum (1) + stop (1) = 2 bytes.
pub const TRAILER_SIZE: usize = 2;

/// Largest possible frame on the wire.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD + TRAILER_SIZE;

/// Fixed-size payload buffer; one frame's worth of bytes.
pub type PayloadBuffer = [u8; MAX_PAYLOAD];

/// Encode the first `len` bytes of `payload` as a frame appended to `dst`.
///
/// `len` is clamped to `MAX_PAYLOAD` and to the size of `payload`. The
/// payload range is stuffed **in place**: its previous contents must not be
/// reused afterwards. Returns the payload length actually framed.
///
/// Wire format:
/// ```text
/// ┌───────┬────┬──────────┬────────┬─────────────────┬──────────┬──────┐
/// │ Start │ ID │ Overhead │ Length │ Stuffed payload │ Checksum │ Stop │
/// │ 0x7E  │    │ 0xFF=none│ 1..254 │ (Length bytes)  │          │ 0x81 │
/// └───────┴────┴──────────┴────────┴─────────────────┴──────────┴──────┘
/// ```
pub fn encode_frame(
    table: &ChecksumTable,
    id: u8,
    payload: &mut [u8],
    len: usize,
    dst: &mut BytesMut,
) -> usize {
    let len = len.min(MAX_PAYLOAD).min(payload.len());
    let overhead = compute_overhead(payload, len);
    stuff(payload, len);
    let checksum = table.checksum(&payload[..len]);

    dst.reserve(HEADER_SIZE + len + TRAILER_SIZE);
    dst.put_u8(START_BYTE);
    dst.put_u8(id);
    dst.put_u8(overhead);
    dst.put_u8(len as u8);
    dst.put_slice(&payload[..len]);
    dst.put_u8(checksum);
    dst.put_u8(STOP_BYTE);
    len
}

/// Encode a frame from a borrowed payload, leaving the caller's bytes intact.
pub fn encode_packet(table: &ChecksumTable, id: u8, payload: &[u8]) -> Bytes {
    let mut scratch = payload[..payload.len().min(MAX_PAYLOAD)].to_vec();
    let len = scratch.len();
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + len + TRAILER_SIZE);
    encode_frame(table, id, &mut scratch, len, &mut dst);
    dst.freeze()
}

/// Checksum parameters shared by both ends of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    /// Checksum polynomial. Default: `0x9B`.
    pub polynomial: u8,
    /// Checksum table width in bits. Default: 8.
    pub table_width: u32,
}

impl FrameConfig {
    /// Build the checksum table for this configuration.
    ///
    /// Default parameters reuse the process-wide shared table.
    pub fn build_table(&self) -> Result<Arc<ChecksumTable>> {
        if *self == Self::default() {
            return Ok(ChecksumTable::shared());
        }
        ChecksumTable::new(self.polynomial, self.table_width).map(Arc::new)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            polynomial: DEFAULT_POLYNOMIAL,
            table_width: DEFAULT_TABLE_WIDTH,
        }
    }
}
