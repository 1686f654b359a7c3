/// Errors that can occur while writing or reading typed values.
///
/// A failed write leaves the destination buffer untouched.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// No encoding rule exists for the requested value or type.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The value would not fit inside the buffer.
    #[error("{len} bytes at offset {start} exceed buffer capacity {capacity}")]
    OutOfBounds {
        start: usize,
        len: usize,
        capacity: usize,
    },

    /// A number does not fit the selected scalar format.
    #[error("value {value} out of range for format '{format}'")]
    OutOfRange { value: String, format: char },

    /// Text, JSON and list reads need an explicit byte count.
    #[error("byte size required for this read")]
    MissingByteSize,

    /// List reads need an element format.
    #[error("list element format required")]
    MissingListFormat,

    /// The byte count is not a whole number of list elements.
    #[error("{byte_size} bytes is not a multiple of element size {element_size}")]
    MisalignedList {
        byte_size: usize,
        element_size: usize,
    },

    /// Text bytes are not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// JSON text could not be produced or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Not one of the known scalar format codes.
    #[error("unknown format code '{0}'")]
    UnknownFormatCode(char),

    /// Not one of the known byte-order names or symbols.
    #[error("unknown byte order '{0}'")]
    UnknownByteOrder(String),
}

pub type Result<T> = std::result::Result<T, MarshalError>;
