//! Runtime error types.
//!
//! Every I/O failure carries its operating-system error as a source, so the
//! full context (what failed, where, and the OS error text) is available
//! through `Display` and `std::error::Error::source`.

use std::io;
use std::os::unix::io::RawFd;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the runtime.
///
/// The event loop never propagates errors across the loop boundary: per-
/// connection failures are reported through [`EventHandler::on_error`] and
/// handled locally. Only [`Error::InitFailed`] (construction) and
/// [`Error::FatalLoop`] (unrecoverable poll failure) terminate anything.
///
/// [`EventHandler::on_error`]: crate::EventHandler::on_error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The readiness poller could not be created.
    #[error("readiness poller creation failed: {0}")]
    InitFailed(#[source] io::Error),

    /// Listener construction failed at the named stage.
    #[error("listener setup failed during {stage}: {source}")]
    ListenerSetupFailed {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    /// A descriptor could not be registered with the poller.
    #[error("failed to register fd {fd} with the poller: {source}")]
    RegisterFailed {
        fd: RawFd,
        #[source]
        source: io::Error,
    },

    /// The accept loop bailed out on resource exhaustion or an unexpected
    /// accept failure. Pending connections stay queued in the backlog and
    /// the loop retries on the next iteration.
    #[error("accept failed, backlog left pending: {0}")]
    AcceptSaturated(#[source] io::Error),

    /// A send or recv on an established connection failed with a
    /// non-retryable code. The connection is scheduled for closure.
    #[error("{op} failed on connection {fd}: {source}")]
    ConnectionIo {
        fd: RawFd,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The poller wait failed with something other than an interruption.
    /// The event loop exits cleanly after reporting this.
    #[error("fatal poller error, event loop exiting: {0}")]
    FatalLoop(#[source] io::Error),

    /// Port outside the valid range.
    #[error("port {0} is out of range 1-65535")]
    InvalidPort(u32),

    /// Address family other than IPv4 or IPv6.
    #[error("address family {0} is not IPv4 or IPv6")]
    InvalidFamily(i32),
}

impl Error {
    /// The raw OS error code behind this error, when one exists.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Error::InitFailed(e)
            | Error::ListenerSetupFailed { source: e, .. }
            | Error::RegisterFailed { source: e, .. }
            | Error::AcceptSaturated(e)
            | Error::ConnectionIo { source: e, .. }
            | Error::FatalLoop(e) => e.raw_os_error(),
            Error::InvalidPort(_) | Error::InvalidFamily(_) => None,
        }
    }
}
