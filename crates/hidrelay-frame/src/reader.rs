use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::frame::{Frame, FrameConfig};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete fixed-size frames from any `Read` stream.
///
/// Bytes are accumulated across short reads and across read timeouts, so a
/// frame split over several reads is still delivered whole. Bytes past the
/// current frame stay buffered for the next call.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            config,
        }
    }

    /// Read the next complete frame (blocking up to the stream's read timeout).
    ///
    /// - `Ok(Some(frame))`: exactly `frame_size` bytes.
    /// - `Ok(None)`: the peer closed cleanly on a frame boundary.
    /// - `Err(FrameError::Incomplete)`: the peer closed mid-frame; the partial
    ///   bytes are discarded.
    /// - `Err(FrameError::TimedOut)`: nothing complete yet; call again.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.take_buffered() {
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(FrameError::TimedOut)
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let received = self.buf.len();
                self.buf.clear();
                return Err(FrameError::Incomplete {
                    received,
                    expected: self.config.frame_size,
                });
            }

            trace!(bytes = read, "read from upstream");
            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Pop a complete frame that is already buffered, without touching the stream.
    pub fn take_buffered(&mut self) -> Option<Frame> {
        if self.buf.len() < self.config.frame_size {
            return None;
        }
        Some(Frame::new(self.buf.split_to(self.config.frame_size).freeze()))
    }

    /// Number of bytes received but not yet returned as a frame.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
