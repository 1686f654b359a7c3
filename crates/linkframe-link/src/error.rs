/// Errors that can occur in link operations.
///
/// Framing problems on the wire are not errors; they surface as
/// [`Status`](linkframe_frame::Status) values.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Frame-level error, including transport failures while sending or
    /// servicing.
    #[error("frame error: {0}")]
    Frame(#[from] linkframe_frame::FrameError),

    /// A value could not be written to or read from a payload buffer.
    #[error("marshal error: {0}")]
    Marshal(#[from] linkframe_marshal::MarshalError),

    /// The callback list cannot be installed.
    #[error("invalid callback list: {0}")]
    InvalidCallbackList(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;
