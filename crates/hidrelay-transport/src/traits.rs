use std::fmt;
use std::io::Read;
use std::time::Duration;

use crate::error::Result;

/// Opaque identity of a connected peer, used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr(String);

impl PeerAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One accepted peer session.
///
/// Owns the stream for the lifetime of the session; dropping the connection
/// closes it.
pub struct Connection<S> {
    stream: S,
    peer: PeerAddr,
}

impl<S> Connection<S> {
    pub fn new(stream: S, peer: PeerAddr) -> Self {
        Self { stream, peer }
    }

    pub fn peer(&self) -> &PeerAddr {
        &self.peer
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Split into the stream and the peer identity.
    pub fn into_parts(self) -> (S, PeerAddr) {
        (self.stream, self.peer)
    }
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

/// A source of upstream connections, one at a time.
pub trait Acceptor {
    /// The byte stream handed out per accepted connection.
    type Stream: Read;

    /// Wait up to `timeout` for the next peer.
    ///
    /// Returns `Ok(None)` when no peer arrived in time (or the wait was
    /// interrupted), letting the caller check for shutdown before waiting again.
    fn accept_timeout(&mut self, timeout: Duration) -> Result<Option<Connection<Self::Stream>>>;

    /// Human-readable endpoint description for diagnostics.
    fn endpoint(&self) -> String;
}

impl<A: Acceptor + ?Sized> Acceptor for Box<A> {
    type Stream = A::Stream;

    fn accept_timeout(&mut self, timeout: Duration) -> Result<Option<Connection<Self::Stream>>> {
        (**self).accept_timeout(timeout)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

/// A connected upstream stream, independent of the transport that produced it.
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    #[cfg(target_os = "linux")]
    Rfcomm(crate::rfcomm::RfcommStream),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
            #[cfg(target_os = "linux")]
            LinkStreamInner::Rfcomm(stream) => stream.read(buf),
        }
    }
}

impl LinkStream {
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    #[cfg(target_os = "linux")]
    pub(crate) fn from_rfcomm(stream: crate::rfcomm::RfcommStream) -> Self {
        Self {
            inner: LinkStreamInner::Rfcomm(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(target_os = "linux")]
            LinkStreamInner::Rfcomm(stream) => stream.set_read_timeout(timeout),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => "unix-domain-socket",
            #[cfg(target_os = "linux")]
            LinkStreamInner::Rfcomm(_) => "rfcomm",
        }
    }
}

impl fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
