//! Embedder callback surface.

use crate::error::Error;
use crate::reactor::ReactorCtx;
use std::fmt;
use std::os::unix::io::RawFd;

/// Identifies a connection in callbacks and [`ReactorCtx`] operations.
///
/// Tokens are raw descriptors under the hood; a token stays valid from
/// `on_open` until `on_close` returns for that connection. Holding a token
/// past `on_close` is harmless: operations on a dead token are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnToken(pub(crate) RawFd);

impl ConnToken {
    /// Rebuild a token from a raw descriptor value.
    pub fn from_raw(fd: RawFd) -> Self {
        Self(fd)
    }

    /// The raw descriptor value behind this token.
    pub fn as_raw(&self) -> RawFd {
        self.0
    }
}

impl fmt::Display for ConnToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application logic supplied to the reactor.
///
/// Every method runs on the reactor's I/O thread, synchronously with the
/// event loop. Callbacks must not block: anything slow belongs on another
/// thread, with results handed back through a queue drained in
/// [`on_tick`](Self::on_tick). A panic inside a callback unwinds through the
/// event loop and is an embedder bug, not a reactor error path.
///
/// Guarantees per connection: `on_open` is invoked exactly once and before
/// any `on_message`; `on_message` chunks arrive in kernel receive order with
/// no framing applied; `on_close` is invoked exactly once, after the last
/// `on_message` and before the descriptor is closed.
pub trait EventHandler {
    /// Invoked once, after the listener is armed and before the first wait.
    fn on_listen(&mut self, ctx: &mut ReactorCtx) {
        let _ = ctx;
    }

    /// Invoked once, after the event loop exits. No callback fires after
    /// this one.
    fn on_shutdown(&mut self, ctx: &mut ReactorCtx) {
        let _ = ctx;
    }

    /// Invoked on every loop iteration before the reactor blocks.
    /// Useful for housekeeping and for draining cross-thread queues.
    fn on_tick(&mut self, ctx: &mut ReactorCtx) {
        let _ = ctx;
    }

    /// A new connection was accepted and registered.
    fn on_open(&mut self, ctx: &mut ReactorCtx, conn: ConnToken) {
        let _ = (ctx, conn);
    }

    /// A chunk of inbound bytes arrived. `data` is borrowed from the
    /// reactor's read buffer and is only valid for the duration of the call;
    /// copy it out if it must outlive the callback.
    fn on_message(&mut self, ctx: &mut ReactorCtx, conn: ConnToken, data: &[u8]) {
        let _ = (ctx, conn, data);
    }

    /// The connection was removed from the poller; its descriptor closes
    /// when this returns.
    fn on_close(&mut self, ctx: &mut ReactorCtx, conn: ConnToken) {
        let _ = (ctx, conn);
    }

    /// A recoverable error occurred, or the poller failed fatally. The
    /// reactor decides whether the loop continues; this is advisory.
    fn on_error(&mut self, ctx: &mut ReactorCtx, err: &Error) {
        let _ = ctx;
        tracing::error!(error = %err, "reactor error");
    }
}
