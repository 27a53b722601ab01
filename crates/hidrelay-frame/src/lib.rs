//! Fixed-size report framing between an upstream byte stream and a HID gadget node.
//!
//! Every frame is exactly `frame_size` bytes (7 for the boot-style keyboard
//! report the relay was built for). There is no header and no negotiation:
//! peer, reader and writer agree on the size out of band.
//!
//! - [`FrameReader`] accumulates bytes from any `Read` until a whole frame is
//!   available, and distinguishes a clean close from a truncated one.
//! - [`DeviceWriter`] writes a whole frame and flushes before returning.

pub mod error;
pub mod frame;
pub mod reader;
pub mod report;
pub mod writer;

pub use error::{DeviceError, FrameError, Result};
pub use frame::{Frame, FrameConfig, DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE};
pub use reader::FrameReader;
pub use report::KeyboardReport;
pub use writer::DeviceWriter;
