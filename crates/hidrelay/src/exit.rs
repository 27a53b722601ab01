use std::fmt;
use std::io;

use hidrelay_frame::{DeviceError, FrameError};
use hidrelay_link::LinkError;
use hidrelay_transport::TransportError;

// Process exit codes. 64 and 74 follow sysexits(3); the rest are relay-specific.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const USAGE: i32 = 64;
/// sysexits `EX_IOERR`: the HID device stopped accepting reports.
pub const DEVICE_ERROR: i32 = 74;
pub const TIMEOUT: i32 = 124;
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
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::InvalidAddress(_) | TransportError::PathTooLong { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        TransportError::Connect { source, .. } => io_error(context, source),
        TransportError::Bind { .. } | TransportError::Accept(_) | TransportError::Io(_) => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::InvalidFrameSize { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::Io(source) => io_error(context, source),
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

/// Every device failure, including a failed open, exits with [`DEVICE_ERROR`].
pub fn device_error(context: &str, err: DeviceError) -> CliError {
    CliError::new(DEVICE_ERROR, format!("{context}: {err}"))
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    match err {
        LinkError::Device(err) => device_error(context, err),
        LinkError::Accept(err) => transport_error(context, err),
        err @ LinkError::FrameSizeMismatch { .. } => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errors_have_distinct_code() {
        let err = link_error(
            "relay failed",
            LinkError::Device(DeviceError::Write(io::Error::from(io::ErrorKind::BrokenPipe))),
        );
        assert_eq!(err.code, DEVICE_ERROR);
        assert!(err.message.starts_with("relay failed: device write failed"));
    }

    #[test]
    fn listener_failure_is_transport_error() {
        let err = link_error(
            "relay failed",
            LinkError::Accept(TransportError::Accept(io::Error::from(
                io::ErrorKind::Other,
            ))),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn frame_size_mismatch_is_internal() {
        let err = link_error(
            "relay setup failed",
            LinkError::FrameSizeMismatch { device: 8, frame: 7 },
        );
        assert_eq!(err.code, INTERNAL);
        assert!(err.message.contains("8-byte reports"));
    }

    #[test]
    fn invalid_address_is_usage() {
        let err = transport_error("bind failed", TransportError::InvalidAddress("x".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn permission_denied_maps_through_io() {
        let err = io_error("connect", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
