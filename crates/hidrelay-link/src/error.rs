use hidrelay_frame::DeviceError;
use hidrelay_transport::TransportError;

/// Errors that stop the supervisor.
///
/// Session-level failures never appear here; they end the session and the
/// supervisor goes back to listening.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The HID device rejected a write or flush.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The listener itself failed while waiting for a peer.
    #[error("accept failed: {0}")]
    Accept(#[source] TransportError),

    /// The device writer and the frame reader disagree on the report size.
    #[error("device expects {device}-byte reports but frames are {frame} bytes")]
    FrameSizeMismatch { device: usize, frame: usize },
}

pub type Result<T> = std::result::Result<T, LinkError>;
