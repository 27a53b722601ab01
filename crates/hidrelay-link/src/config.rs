use std::time::Duration;

use hidrelay_frame::FrameConfig;

/// Supervisor behaviour.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Framing shared with the peer.
    pub frame: FrameConfig,
    /// Longest a single accept wait may block before the shutdown flag is
    /// re-checked. Acceptors should use the same value as their stream read
    /// timeout so blocked reads are bounded too.
    pub poll_interval: Duration,
    /// After a session ends, write an all-zero report if the last relayed
    /// report still held keys.
    pub release_on_disconnect: bool,
    /// On shutdown mid-session, relay complete frames already buffered.
    pub drain_on_shutdown: bool,
}

impl LinkConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            release_on_disconnect: false,
            drain_on_shutdown: true,
        }
    }
}
