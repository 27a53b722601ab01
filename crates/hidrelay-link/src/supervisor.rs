use std::io::Write;

use hidrelay_frame::{DeviceError, DeviceWriter, Frame, FrameError, FrameReader, KeyboardReport};
use hidrelay_transport::{Acceptor, Connection};
use tracing::{debug, error, info, warn};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::shutdown::ShutdownSignal;
use crate::state::LinkState;
use crate::summary::{RunSummary, SessionEnd, SessionReport};

type TransitionHook = Box<dyn FnMut(&LinkState) + Send>;

/// Relays frames from one upstream peer at a time into the HID device.
///
/// The supervisor owns the device writer for its whole lifetime; [`run`]
/// consumes the supervisor, so the device is closed on every exit path.
/// Each accepted connection is owned by the session that serves it and is
/// dropped before the next accept.
///
/// [`run`]: LinkSupervisor::run
pub struct LinkSupervisor<A, W> {
    acceptor: A,
    device: DeviceWriter<W>,
    config: LinkConfig,
    shutdown: ShutdownSignal,
    state: LinkState,
    summary: RunSummary,
    on_transition: Option<TransitionHook>,
}

impl<A: Acceptor, W: Write> LinkSupervisor<A, W> {
    /// Fails if `device` was built for a different report size than
    /// `config.frame`, which would make every relayed frame a device error.
    pub fn new(
        acceptor: A,
        device: DeviceWriter<W>,
        config: LinkConfig,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        if device.frame_size() != config.frame.frame_size {
            return Err(LinkError::FrameSizeMismatch {
                device: device.frame_size(),
                frame: config.frame.frame_size,
            });
        }
        Ok(Self {
            acceptor,
            device,
            config,
            shutdown,
            state: LinkState::Listening,
            summary: RunSummary::default(),
            on_transition: None,
        })
    }

    /// Observe every state change (including the final `Stopped`).
    pub fn on_transition(mut self, hook: impl FnMut(&LinkState) + Send + 'static) -> Self {
        self.on_transition = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &LinkState {
        &self.state
    }

    /// Run until shutdown is requested or the device fails.
    ///
    /// Returns the run summary after a requested shutdown. A device failure
    /// or a broken listener is returned as an error; no further frames are
    /// written after a device failure.
    pub fn run(mut self) -> Result<RunSummary> {
        info!(
            endpoint = %self.acceptor.endpoint(),
            frame_size = self.config.frame.frame_size,
            "relay started"
        );
        if let Some(hook) = self.on_transition.as_mut() {
            hook(&self.state);
        }

        let result = self.listen_loop();
        self.transition(LinkState::Stopped);

        match &result {
            Ok(()) => info!(
                sessions = self.summary.sessions,
                frames = self.summary.frames_relayed,
                "relay stopped"
            ),
            Err(err) => error!(
                error = %err,
                sessions = self.summary.sessions,
                frames = self.summary.frames_relayed,
                "relay stopped on fatal error"
            ),
        }

        result.map(|()| std::mem::take(&mut self.summary))
    }

    fn listen_loop(&mut self) -> Result<()> {
        loop {
            if self.shutdown.is_requested() {
                info!("shutdown requested while listening");
                return Ok(());
            }

            let conn = match self.acceptor.accept_timeout(self.config.poll_interval) {
                Ok(Some(conn)) => conn,
                Ok(None) => continue,
                Err(err) => return Err(LinkError::Accept(err)),
            };

            let end = self.run_session(conn)?;
            if end == SessionEnd::Shutdown {
                return Ok(());
            }
            self.transition(LinkState::Listening);
        }
    }

    fn run_session(&mut self, conn: Connection<A::Stream>) -> std::result::Result<SessionEnd, DeviceError> {
        self.summary.sessions += 1;
        let session = self.summary.sessions;
        let (stream, peer) = conn.into_parts();

        self.transition(LinkState::Connected {
            session,
            peer: peer.clone(),
        });
        info!(session, %peer, "peer connected");

        let mut reader = FrameReader::with_config(stream, self.config.frame.clone());
        let mut frames = 0u64;
        let mut keys_held = false;

        let end = loop {
            if self.shutdown.is_requested() {
                break SessionEnd::Shutdown;
            }
            match reader.read_frame() {
                Ok(Some(frame)) => {
                    self.relay(session, &frame)?;
                    keys_held = frame.as_bytes().iter().any(|b| *b != 0);
                    frames += 1;
                }
                Ok(None) => break SessionEnd::PeerClosed,
                Err(FrameError::TimedOut) => continue,
                Err(FrameError::Incomplete { received, expected }) => {
                    break SessionEnd::Incomplete { received, expected }
                }
                Err(err) => {
                    break SessionEnd::Transport {
                        error: err.to_string(),
                    }
                }
            }
        };

        if end == SessionEnd::Shutdown && self.config.drain_on_shutdown {
            self.transition(LinkState::Draining { session });
            while let Some(frame) = reader.take_buffered() {
                self.relay(session, &frame)?;
                keys_held = frame.as_bytes().iter().any(|b| *b != 0);
                frames += 1;
            }
        }

        // Release the connection before touching the device again.
        drop(reader);

        match &end {
            SessionEnd::PeerClosed => info!(session, %peer, frames, "peer disconnected"),
            SessionEnd::Incomplete { received, expected } => warn!(
                session,
                %peer,
                frames,
                received,
                expected,
                "peer closed mid-frame; fragment discarded"
            ),
            SessionEnd::Transport { error } => {
                warn!(session, %peer, frames, %error, "upstream read failed; dropping session")
            }
            SessionEnd::Shutdown => info!(session, %peer, frames, "session closed for shutdown"),
        }

        if self.config.release_on_disconnect && keys_held {
            debug!(session, "releasing held keys");
            self.device.release_all()?;
            self.summary.releases += 1;
        }

        self.summary.record(SessionReport {
            session,
            peer: peer.to_string(),
            frames,
            end: end.clone(),
        });
        Ok(end)
    }

    fn relay(&mut self, session: u64, frame: &Frame) -> std::result::Result<(), DeviceError> {
        if let Err(err) = self.device.write_frame(frame) {
            error!(session, frame = ?frame, error = %err, "device write failed");
            return Err(err);
        }
        self.summary.frames_relayed += 1;
        match KeyboardReport::parse(frame.as_bytes()) {
            Some(report) if frame.len() == hidrelay_frame::DEFAULT_FRAME_SIZE => {
                debug!(session, %report, "relayed report")
            }
            _ => debug!(session, frame = ?frame, "relayed frame"),
        }
        Ok(())
    }

    fn transition(&mut self, next: LinkState) {
        if self.state == next {
            return;
        }
        debug!(from = %self.state, to = %next, "link state change");
        self.state = next;
        if let Some(hook) = self.on_transition.as_mut() {
            hook(&self.state);
        }
    }
}
