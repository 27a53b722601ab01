use std::fmt;

use bytes::Bytes;

use crate::error::{FrameError, Result};

/// Report size used by the keyboard gadget: 1 modifier byte + 6 key slots.
pub const DEFAULT_FRAME_SIZE: usize = 7;

/// Largest report a full-speed HID interrupt endpoint carries.
pub const MAX_FRAME_SIZE: usize = 64;

/// One complete, immutable report.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// An all-zero frame: no modifiers, no keys held.
    pub fn zeroed(size: usize) -> Self {
        Self::new(vec![0u8; size])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(")?;
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// Framing configuration.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Exact size of every frame in bytes. Default: 7.
    pub frame_size: usize,
}

impl FrameConfig {
    /// Build a config for `frame_size`, rejecting sizes outside `1..=MAX_FRAME_SIZE`.
    pub fn new(frame_size: usize) -> Result<Self> {
        let config = Self { frame_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 || self.frame_size > MAX_FRAME_SIZE {
            return Err(FrameError::InvalidFrameSize {
                size: self.frame_size,
                max: MAX_FRAME_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_renders_hex() {
        let frame = Frame::new(vec![0x01, 0x00, 0xff]);
        assert_eq!(format!("{frame:?}"), "Frame(01 00 ff)");
    }

    #[test]
    fn zeroed_has_requested_size() {
        let frame = Frame::zeroed(DEFAULT_FRAME_SIZE);
        assert_eq!(frame.len(), 7);
        assert!(frame.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn config_rejects_out_of_range_sizes() {
        assert!(matches!(
            FrameConfig::new(0),
            Err(FrameError::InvalidFrameSize { size: 0, .. })
        ));
        assert!(matches!(
            FrameConfig::new(MAX_FRAME_SIZE + 1),
            Err(FrameError::InvalidFrameSize { .. })
        ));
        assert_eq!(FrameConfig::new(8).unwrap().frame_size, 8);
    }
}
