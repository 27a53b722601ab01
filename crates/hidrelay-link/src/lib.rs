//! Connection lifecycle for the HID relay.
//!
//! [`LinkSupervisor`] owns the device writer for the whole run and one
//! upstream connection at a time. Session failures (clean close, truncated
//! frame, transport error) return it to listening; device failures stop it.

pub mod config;
pub mod error;
pub mod shutdown;
pub mod state;
pub mod summary;
pub mod supervisor;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use shutdown::ShutdownSignal;
pub use state::LinkState;
pub use summary::{RunSummary, SessionEnd, SessionReport};
pub use supervisor::LinkSupervisor;
