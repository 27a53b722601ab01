use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, trace};

use crate::error::DeviceError;
use crate::frame::Frame;

/// Writes whole frames to the HID device node.
///
/// Each frame is written in full and flushed before `write_frame` returns, so
/// the gadget consumer sees one discrete report per frame. Writes are never
/// retried: replaying a frame would issue a second, real report.
pub struct DeviceWriter<W> {
    inner: W,
    frame_size: usize,
    frames_written: u64,
}

impl DeviceWriter<File> {
    /// Open an existing device node for writing.
    ///
    /// The node is never created or truncated; a missing `/dev/hidg0` is an
    /// error rather than a new regular file.
    pub fn open(path: impl AsRef<Path>, frame_size: usize) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| DeviceError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(?path, frame_size, "opened hid device");
        Ok(Self::new(file, frame_size))
    }
}

impl<W: Write> DeviceWriter<W> {
    pub fn new(inner: W, frame_size: usize) -> Self {
        Self {
            inner,
            frame_size,
            frames_written: 0,
        }
    }

    /// Write one frame and flush it through to the device.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), DeviceError> {
        let bytes = frame.as_bytes();
        if bytes.len() != self.frame_size {
            return Err(DeviceError::FrameSize {
                size: bytes.len(),
                expected: self.frame_size,
            });
        }

        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(DeviceError::ShortWrite {
                        written: offset,
                        expected: bytes.len(),
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DeviceError::Write(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DeviceError::Flush(err)),
            }
        }

        self.frames_written = self.frames_written.saturating_add(1);
        trace!(frame = ?frame, "wrote report");
        Ok(())
    }

    /// Write an all-zero report, releasing every key and modifier.
    pub fn release_all(&mut self) -> Result<(), DeviceError> {
        self.write_frame(&Frame::zeroed(self.frame_size))
    }

    /// Frames successfully written and flushed so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
