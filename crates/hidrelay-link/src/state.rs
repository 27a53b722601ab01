use std::fmt;

use hidrelay_transport::PeerAddr;

/// Supervisor lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Waiting for a peer. The device is open.
    Listening,
    /// Relaying frames from one peer.
    Connected { session: u64, peer: PeerAddr },
    /// Shutdown requested mid-session; flushing already buffered frames.
    Draining { session: u64 },
    /// Terminal.
    Stopped,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Listening => f.write_str("listening"),
            LinkState::Connected { session, peer } => write!(f, "connected(#{session} {peer})"),
            LinkState::Draining { session } => write!(f, "draining(#{session})"),
            LinkState::Stopped => f.write_str("stopped"),
        }
    }
}
