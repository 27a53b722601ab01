//! Upstream transports for the HID relay.
//!
//! The relay consumes an already-accepted, connection-oriented byte stream.
//! This crate provides the listeners that produce those streams:
//! - Bluetooth RFCOMM (Linux, raw `AF_BLUETOOTH` sockets)
//! - Unix domain sockets (local peers, development and tests)
//!
//! Both implement [`Acceptor`], which waits for one peer at a time with a
//! bounded timeout so callers can observe shutdown requests between waits.

pub mod bdaddr;
pub mod error;
pub mod traits;

#[cfg(unix)]
mod accept;
#[cfg(unix)]
mod poll;
#[cfg(target_os = "linux")]
pub mod rfcomm;
#[cfg(unix)]
pub mod uds;

pub use bdaddr::BdAddr;
pub use error::{Result, TransportError};
pub use traits::{Acceptor, Connection, LinkStream, PeerAddr};

#[cfg(target_os = "linux")]
pub use rfcomm::{RfcommListener, RfcommStream};
#[cfg(unix)]
pub use uds::UnixDomainSocket;
