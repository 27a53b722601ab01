//! Bluetooth RFCOMM (serial port profile) listener.
//!
//! Uses raw `AF_BLUETOOTH` / `BTPROTO_RFCOMM` sockets through `libc`; the
//! adapter, pairing and SDP records are provisioned outside this process.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::{debug, info};

use crate::accept;
use crate::bdaddr::BdAddr;
use crate::error::{Result, TransportError};
use crate::poll::wait_readable;
use crate::traits::{Acceptor, Connection, LinkStream, PeerAddr};

/// `BTPROTO_RFCOMM` from `<bluetooth/bluetooth.h>`; not exported by libc.
const BTPROTO_RFCOMM: libc::c_int = 3;

/// `struct sockaddr_rc` from `<bluetooth/rfcomm.h>`.
#[repr(C)]
#[derive(Clone, Copy)]
struct SockaddrRc {
    rc_family: libc::sa_family_t,
    rc_bdaddr: [u8; 6],
    rc_channel: u8,
}

impl SockaddrRc {
    fn new(addr: BdAddr, channel: u8) -> Self {
        Self {
            rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            rc_bdaddr: addr.to_wire(),
            rc_channel: channel,
        }
    }
}

/// Check that the kernel exposes RFCOMM sockets, without binding anything.
pub fn probe_support() -> io::Result<()> {
    // SAFETY: plain socket(2) call; the descriptor is wrapped and closed on drop.
    let raw = unsafe {
        libc::socket(
            libc::AF_BLUETOOTH,
            libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
            BTPROTO_RFCOMM,
        )
    };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
    drop(unsafe { OwnedFd::from_raw_fd(raw) });
    Ok(())
}

/// Listening RFCOMM socket bound to a local adapter address and channel.
pub struct RfcommListener {
    fd: OwnedFd,
    local: BdAddr,
    channel: u8,
    read_timeout: Option<Duration>,
}

impl RfcommListener {
    /// Default RFCOMM channel.
    pub const DEFAULT_CHANNEL: u8 = 1;
    /// One physical controller, so one pending connection is enough.
    pub const DEFAULT_BACKLOG: i32 = 1;

    /// Bind to `local` (or [`BdAddr::ANY`]) on `channel` and start listening.
    pub fn bind(local: BdAddr, channel: u8, backlog: i32) -> Result<Self> {
        let bind_err = |source: io::Error| TransportError::Bind {
            endpoint: format!("rfcomm:{local}/{channel}"),
            source,
        };

        // SAFETY: plain socket(2) call; the returned descriptor is checked below.
        let raw = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_STREAM | libc::SOCK_CLOEXEC | libc::SOCK_NONBLOCK,
                BTPROTO_RFCOMM,
            )
        };
        if raw < 0 {
            return Err(bind_err(io::Error::last_os_error()));
        }
        // SAFETY: `raw` is a freshly created, valid descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let addr = SockaddrRc::new(local, channel);
        // SAFETY: `addr` is a properly initialised sockaddr_rc and the length
        // passed matches its size.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const SockaddrRc).cast::<libc::sockaddr>(),
                mem::size_of::<SockaddrRc>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(bind_err(io::Error::last_os_error()));
        }

        // SAFETY: `fd` is a bound stream socket.
        let rc = unsafe { libc::listen(fd.as_raw_fd(), backlog) };
        if rc < 0 {
            return Err(bind_err(io::Error::last_os_error()));
        }

        info!(%local, channel, backlog, "listening on rfcomm");

        Ok(Self {
            fd,
            local,
            channel,
            read_timeout: None,
        })
    }

    /// Read timeout applied to every accepted stream.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> BdAddr {
        self.local
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl Acceptor for RfcommListener {
    type Stream = LinkStream;

    fn accept_timeout(&mut self, timeout: Duration) -> Result<Option<Connection<LinkStream>>> {
        if !wait_readable(self.fd.as_fd(), timeout).map_err(TransportError::Accept)? {
            return Ok(None);
        }

        let mut addr = SockaddrRc::new(BdAddr::ANY, 0);
        let mut len = mem::size_of::<SockaddrRc>() as libc::socklen_t;
        // SAFETY: `addr` and `len` are valid writable pointers sized for a
        // sockaddr_rc; the kernel writes at most `len` bytes.
        let raw = unsafe {
            libc::accept4(
                self.fd.as_raw_fd(),
                (&mut addr as *mut SockaddrRc).cast::<libc::sockaddr>(),
                &mut len,
                libc::SOCK_CLOEXEC,
            )
        };
        if raw < 0 {
            return accept::recover(&self.endpoint(), io::Error::last_os_error(), timeout);
        }
        // SAFETY: accept4 returned a new descriptor that we now own exclusively.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let remote = BdAddr::from_wire(addr.rc_bdaddr);
        let stream = RfcommStream::from_owned(fd);
        stream.set_read_timeout(self.read_timeout)?;

        let peer = PeerAddr::new(format!("rfcomm:{remote}"));
        debug!(%peer, "accepted connection");
        Ok(Some(Connection::new(LinkStream::from_rfcomm(stream), peer)))
    }

    fn endpoint(&self) -> String {
        format!("rfcomm:{}/{}", self.local, self.channel)
    }
}

/// Connected RFCOMM stream.
pub struct RfcommStream {
    file: File,
}

impl RfcommStream {
    fn from_owned(fd: OwnedFd) -> Self {
        Self {
            file: File::from(fd),
        }
    }

    /// Set `SO_RCVTIMEO`; `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        let tv = match timeout {
            Some(d) if d.is_zero() => {
                return Err(TransportError::Io(io::Error::new(
                    ErrorKind::InvalidInput,
                    "cannot set a 0 duration timeout",
                )))
            }
            Some(d) => timeval_from(d),
            None => libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
        };

        // SAFETY: `tv` is a valid timeval and the length matches its size;
        // the descriptor is an open socket owned by `self.file`.
        let rc = unsafe {
            libc::setsockopt(
                self.file.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                (&tv as *const libc::timeval).cast::<libc::c_void>(),
                mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(TransportError::Io(io::Error::last_os_error()));
        }
        Ok(())
    }
}

/// Convert a non-zero timeout for `SO_RCVTIMEO`.
///
/// Sub-microsecond values are rounded up: an all-zero `timeval` would turn
/// the timeout off and let reads block forever.
fn timeval_from(d: Duration) -> libc::timeval {
    let mut tv = libc::timeval {
        tv_sec: d.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
        tv_usec: d.subsec_micros() as libc::suseconds_t,
    };
    if tv.tv_sec == 0 && tv.tv_usec == 0 {
        tv.tv_usec = 1;
    }
    tv
}

impl Read for RfcommStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl AsFd for RfcommStream {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}
