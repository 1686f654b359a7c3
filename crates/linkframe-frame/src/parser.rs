use std::fmt;
use std::sync::Arc;

use linkframe_transport::Transport;
use tracing::trace;

use crate::codec::{PayloadBuffer, MAX_PAYLOAD, START_BYTE, STOP_BYTE};
use crate::crc::ChecksumTable;
use crate::error::Result;
use crate::stuffing::destuff;

/// Position of the receive state machine within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Discarding bytes until a start marker.
    #[default]
    FindStart,
    /// Expecting the packet id.
    FindId,
    /// Expecting the overhead byte.
    FindOverhead,
    /// Expecting the payload length.
    FindLength,
    /// Collecting payload bytes.
    FindPayload,
    /// Expecting the checksum.
    FindChecksum,
    /// Expecting the stop marker.
    FindStop,
}

/// Outcome of one servicing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Bytes were consumed but no frame completed.
    Continue,
    /// The transport had nothing to read.
    NoData,
    /// A frame completed; this many payload bytes are ready.
    NewData(usize),
    /// The received checksum did not match the payload.
    ChecksumError,
    /// The declared payload length was zero or above the maximum.
    PayloadLengthError,
    /// The byte after the checksum was not the stop marker.
    StopByteError,
}

impl Status {
    /// Numeric status code, compatible with other SerialTransfer-style peers.
    pub fn code(self) -> i8 {
        match self {
            Status::Continue => 3,
            Status::NewData(_) => 2,
            Status::NoData => 1,
            Status::ChecksumError => 0,
            Status::PayloadLengthError => -1,
            Status::StopByteError => -2,
        }
    }

    /// Classification name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Continue => "CONTINUE",
            Status::NewData(_) => "NEW_DATA",
            Status::NoData => "NO_DATA",
            Status::ChecksumError => "CRC_ERROR",
            Status::PayloadLengthError => "PAYLOAD_ERROR",
            Status::StopByteError => "STOP_BYTE_ERROR",
        }
    }

    /// True for the three framing error outcomes.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Status::ChecksumError | Status::PayloadLengthError | Status::StopByteError
        )
    }

    /// Payload bytes made available by this outcome.
    pub fn bytes_read(self) -> usize {
        match self {
            Status::NewData(n) => n,
            _ => 0,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incremental receive state machine.
///
/// Reassembles frames byte by byte into a caller-owned payload buffer. A
/// frame may span any number of servicing calls; every terminal outcome,
/// good or bad, returns the machine to [`ParserState::FindStart`].
#[derive(Debug)]
pub struct FrameParser {
    state: ParserState,
    bytes_to_receive: usize,
    cursor: usize,
    overhead: u8,
    id: u8,
    table: Arc<ChecksumTable>,
}

impl FrameParser {
    /// Create a parser using the default shared checksum table.
    pub fn new() -> Self {
        Self::with_table(ChecksumTable::shared())
    }

    /// Create a parser with an explicit checksum table.
    pub fn with_table(table: Arc<ChecksumTable>) -> Self {
        Self {
            state: ParserState::FindStart,
            bytes_to_receive: 0,
            cursor: 0,
            overhead: 0,
            id: 0,
            table,
        }
    }

    /// Current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Id byte of the most recent (or in-progress) frame.
    pub fn packet_id(&self) -> u8 {
        self.id
    }

    /// Abandon any partial frame.
    pub fn reset(&mut self) {
        self.state = ParserState::FindStart;
        self.bytes_to_receive = 0;
        self.cursor = 0;
    }

    /// Payload bytes still expected for the current frame.
    pub fn payload_remaining(&self) -> usize {
        match self.state {
            ParserState::FindPayload => self.bytes_to_receive - self.cursor,
            _ => 0,
        }
    }

    /// Advance the machine by one byte.
    ///
    /// Returns `Some` on a terminal outcome: [`Status::NewData`] (the payload
    /// in `rx` is already destuffed) or one of the framing errors.
    pub fn feed(&mut self, byte: u8, rx: &mut PayloadBuffer) -> Option<Status> {
        match self.state {
            ParserState::FindStart => {
                if byte == START_BYTE {
                    self.state = ParserState::FindId;
                }
                None
            }
            ParserState::FindId => {
                self.id = byte;
                self.state = ParserState::FindOverhead;
                None
            }
            ParserState::FindOverhead => {
                self.overhead = byte;
                self.state = ParserState::FindLength;
                None
            }
            ParserState::FindLength => {
                let len = usize::from(byte);
                if (1..=MAX_PAYLOAD).contains(&len) {
                    self.bytes_to_receive = len;
                    self.cursor = 0;
                    self.state = ParserState::FindPayload;
                    None
                } else {
                    Some(self.fail(Status::PayloadLengthError))
                }
            }
            ParserState::FindPayload => {
                rx[self.cursor] = byte;
                self.advance_payload(1);
                None
            }
            ParserState::FindChecksum => {
                let expected = self.table.checksum(&rx[..self.bytes_to_receive]);
                if byte == expected {
                    self.state = ParserState::FindStop;
                    None
                } else {
                    Some(self.fail(Status::ChecksumError))
                }
            }
            ParserState::FindStop => {
                if byte != STOP_BYTE {
                    return Some(self.fail(Status::StopByteError));
                }
                let len = self.bytes_to_receive;
                destuff(&mut rx[..len], self.overhead);
                self.reset();
                trace!(id = self.id, len, "frame received");
                Some(Status::NewData(len))
            }
        }
    }

    /// Drain what the transport has ready and advance the machine.
    ///
    /// Consumes at most the number of bytes the transport reported at entry.
    /// Returns as soon as a frame completes or fails, leaving any remaining
    /// bytes in the transport for the next call.
    pub fn service<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        rx: &mut PayloadBuffer,
    ) -> Result<Status> {
        let mut budget = transport.bytes_available()?;
        if budget == 0 {
            return Ok(Status::NoData);
        }

        let mut byte = [0u8; 1];
        while budget > 0 {
            if transport.read_available(&mut byte)? == 0 {
                break;
            }
            budget -= 1;

            if let Some(status) = self.feed(byte[0], rx) {
                return Ok(status);
            }

            let wanted = self.payload_remaining().min(budget);
            if wanted > 0 {
                let start = self.cursor;
                let n = transport.read_available(&mut rx[start..start + wanted])?;
                self.advance_payload(n);
                budget -= n;
            }
        }

        Ok(Status::Continue)
    }

    fn advance_payload(&mut self, n: usize) {
        self.cursor += n;
        if self.cursor == self.bytes_to_receive {
            self.state = ParserState::FindChecksum;
        }
    }

    fn fail(&mut self, status: Status) -> Status {
        trace!(id = self.id, status = status.as_str(), "frame rejected");
        self.reset();
        status
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
