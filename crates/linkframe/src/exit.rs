use std::fmt;
use std::io;

use linkframe_frame::FrameError;
use linkframe_link::LinkError;
use linkframe_marshal::MarshalError;
use linkframe_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::BrokenPipe | io::ErrorKind::TimedOut => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn serial_error(context: &str, err: serialport::Error) -> CliError {
    CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::InvalidTableWidth { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::NotAByte(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn marshal_error(context: &str, err: MarshalError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    match err {
        LinkError::Frame(err) => frame_error(context, err),
        LinkError::Marshal(err) => marshal_error(context, err),
        LinkError::Config(_) | LinkError::InvalidCallbackList(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_transport_errors_map_to_transport_code() {
        let err = frame_error("send failed", FrameError::Transport(TransportError::Closed));
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("send failed: "));
    }

    #[test]
    fn link_transport_failures_map_to_transport_code() {
        let err = link_error(
            "receive failed",
            LinkError::Frame(FrameError::Transport(TransportError::Closed)),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn bad_table_width_is_usage() {
        let err = link_error(
            "config",
            LinkError::Frame(FrameError::InvalidTableWidth { bits: 2 }),
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn marshal_errors_are_invalid_data() {
        let err = link_error(
            "read",
            LinkError::Marshal(MarshalError::MissingListFormat),
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_file_is_failure() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, FAILURE);
    }
}
