use std::path::PathBuf;

/// Errors raised while pulling frames from the upstream stream.
///
/// All of these end the current session; none of them are fatal to the relay.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream closed after delivering part of a frame.
    #[error("connection closed mid-frame ({received} of {expected} bytes)")]
    Incomplete { received: usize, expected: usize },

    /// No complete frame arrived within the read timeout. Buffered bytes are kept.
    #[error("timed out waiting for frame data")]
    TimedOut,

    /// Frame size outside the supported range.
    #[error("invalid frame size {size} (must be 1..={max})")]
    InvalidFrameSize { size: usize, max: usize },

    /// An I/O error occurred while reading.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the HID device sink.
///
/// Any of these means reports can no longer be delivered; the relay stops.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device node could not be opened for writing.
    #[error("failed to open device {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The write itself failed.
    #[error("device write failed: {0}")]
    Write(std::io::Error),

    /// The device accepted fewer bytes than a full frame.
    #[error("device accepted {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Flushing the written report failed.
    #[error("device flush failed: {0}")]
    Flush(std::io::Error),

    /// The frame handed to the writer does not match the configured size.
    #[error("frame is {size} bytes, device expects {expected}")]
    FrameSize { size: usize, expected: usize },
}

impl DeviceError {
    /// Underlying OS error, if any.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            DeviceError::Open { source, .. } => Some(source),
            DeviceError::Write(err) | DeviceError::Flush(err) => Some(err),
            DeviceError::ShortWrite { .. } | DeviceError::FrameSize { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
