use std::io::{self, ErrorKind};
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::{Result, TransportError};

/// How a listener should react to a failed `accept(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcceptFailure {
    /// Nothing to hand out right now; wait again.
    Spurious,
    /// Resource pressure or a network error on the pending connection.
    /// The listener is fine; back off and retry.
    Transient,
    /// The listening socket itself is unusable.
    Fatal,
}

pub(crate) fn classify(err: &io::Error) -> AcceptFailure {
    if matches!(
        err.kind(),
        ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::ConnectionAborted
    ) {
        return AcceptFailure::Spurious;
    }

    match err.raw_os_error() {
        Some(
            libc::EMFILE
            | libc::ENFILE
            | libc::ENOBUFS
            | libc::ENOMEM
            | libc::EPROTO
            | libc::ENOPROTOOPT
            | libc::EOPNOTSUPP
            | libc::EHOSTDOWN
            | libc::EHOSTUNREACH
            | libc::ENETDOWN
            | libc::ENETUNREACH,
        ) => AcceptFailure::Transient,
        #[cfg(target_os = "linux")]
        Some(libc::ENONET) => AcceptFailure::Transient,
        _ => AcceptFailure::Fatal,
    }
}

/// Map an `accept(2)` failure to "no peer yet" or a listener error.
///
/// Transient failures sleep for `backoff` first: the pending connection keeps
/// the socket readable, so retrying at once would spin.
pub(crate) fn recover<T>(endpoint: &str, err: io::Error, backoff: Duration) -> Result<Option<T>> {
    match classify(&err) {
        AcceptFailure::Spurious => Ok(None),
        AcceptFailure::Transient => {
            warn!(
                %endpoint,
                error = %err,
                backoff_ms = backoff.as_millis() as u64,
                "accept failed; retrying"
            );
            thread::sleep(backoff);
            Ok(None)
        }
        AcceptFailure::Fatal => Err(TransportError::Accept(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn os(code: i32) -> io::Error {
        io::Error::from_raw_os_error(code)
    }

    #[test]
    fn resource_exhaustion_is_transient() {
        for code in [libc::EMFILE, libc::ENFILE, libc::ENOBUFS, libc::ENOMEM] {
            assert_eq!(classify(&os(code)), AcceptFailure::Transient, "errno {code}");
        }
    }

    #[test]
    fn pending_network_errors_are_transient() {
        for code in [libc::EPROTO, libc::EHOSTDOWN, libc::ENETDOWN, libc::EHOSTUNREACH] {
            assert_eq!(classify(&os(code)), AcceptFailure::Transient, "errno {code}");
        }
    }

    #[test]
    fn nothing_pending_is_spurious() {
        assert_eq!(classify(&os(libc::EAGAIN)), AcceptFailure::Spurious);
        assert_eq!(classify(&os(libc::EINTR)), AcceptFailure::Spurious);
        assert_eq!(classify(&os(libc::ECONNABORTED)), AcceptFailure::Spurious);
    }

    #[test]
    fn broken_listener_is_fatal() {
        for code in [libc::EBADF, libc::EINVAL, libc::ENOTSOCK] {
            assert_eq!(classify(&os(code)), AcceptFailure::Fatal, "errno {code}");
        }
    }

    #[test]
    fn transient_failure_backs_off_then_reports_no_peer() {
        let backoff = Duration::from_millis(30);
        let start = Instant::now();
        let outcome: Result<Option<()>> = recover("test", os(libc::EMFILE), backoff);
        assert!(matches!(outcome, Ok(None)));
        assert!(start.elapsed() >= backoff);
    }

    #[test]
    fn fatal_failure_is_returned() {
        let outcome: Result<Option<()>> = recover("test", os(libc::EBADF), Duration::ZERO);
        assert!(matches!(outcome, Err(TransportError::Accept(_))));
    }
}
