/// Errors that can occur while building checksums or moving frames.
///
/// Malformed frames on the wire are not errors: the receive state machine
/// reports them as [`Status`](crate::Status) values and resynchronizes.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The checksum table width cannot cover every input byte.
    #[error("invalid checksum table width ({bits} bits, expected 8..=16)")]
    InvalidTableWidth { bits: u32 },

    /// A checksum input element could not be coerced to a single byte.
    #[error("checksum input is not a byte: {0}")]
    NotAByte(String),

    /// The transport failed while reading or writing frame bytes.
    #[error("frame transport error: {0}")]
    Transport(#[from] linkframe_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
