//! Bluetooth-to-USB HID report relay.
//!
//! hidrelay accepts one upstream peer at a time (Bluetooth RFCOMM, or a Unix
//! domain socket for local peers), reads fixed-size reports from it and writes
//! each one, flushed, to a USB HID gadget node such as `/dev/hidg0`.
//!
//! # Crate Structure
//!
//! - [`transport`]: upstream listeners and the `Acceptor` trait
//! - [`frame`]: fixed-size frame reader and device writer
//! - [`link`]: the link supervisor and its lifecycle

/// Re-export transport types.
pub mod transport {
    pub use hidrelay_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use hidrelay_frame::*;
}

/// Re-export link supervisor types.
pub mod link {
    pub use hidrelay_link::*;
}
