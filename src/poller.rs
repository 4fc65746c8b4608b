//! Edge-triggered readiness poller.
//!
//! Thin wrapper over mio's `Poll`/`Events` (epoll on Linux, kqueue on other
//! Unix systems). mio registers every source in edge-triggered mode, so each
//! readiness transition is reported once and the caller must drain the
//! descriptor until the kernel reports "would block".
//!
//! Descriptors are registered through `SourceFd` with `Token(fd)`: the
//! kernel guarantees descriptor uniqueness among open descriptors, so raw
//! descriptors double as poller tokens with no offset scheme.

use crate::error::{Error, Result};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Initial readiness batch capacity. Doubles whenever a wait fills the
/// batch entirely; never shrinks.
pub(crate) const INITIAL_BATCH_CAPACITY: usize = 4096;

/// One readiness record, decoded from a poller event.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Readiness {
    pub fd: RawFd,
    pub readable: bool,
    pub writable: bool,
    /// Full hangup: both halves of the stream reported closed.
    pub hangup: bool,
    pub error: bool,
}

pub(crate) struct Poller {
    poll: Poll,
    events: Events,
    capacity: usize,
    grow_pending: bool,
}

impl Poller {
    /// Create a poller. The underlying epoll/kqueue descriptor is created
    /// close-on-exec.
    pub fn new(batch_capacity: usize) -> Result<Self> {
        let poll = Poll::new().map_err(Error::InitFailed)?;
        Ok(Self {
            poll,
            events: Events::with_capacity(batch_capacity),
            capacity: batch_capacity,
            grow_pending: false,
        })
    }

    /// Begin monitoring `fd` for `interest`, edge-triggered.
    pub fn add(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), Token(fd as usize), interest)
    }

    /// Replace the monitored interest set for `fd`.
    pub fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.poll
            .registry()
            .reregister(&mut SourceFd(&fd), Token(fd as usize), interest)
    }

    /// Stop monitoring `fd`.
    pub fn remove(&self, fd: RawFd) -> io::Result<()> {
        self.poll.registry().deregister(&mut SourceFd(&fd))
    }

    /// Block for up to `timeout` and decode ready events into `out`.
    ///
    /// Returns the number of records. A saturated batch schedules a capacity
    /// doubling for the next wait; the saturated batch itself is still
    /// returned in full. Interruption surfaces as
    /// `io::ErrorKind::Interrupted`.
    pub fn wait(&mut self, out: &mut Vec<Readiness>, timeout: Option<Duration>) -> io::Result<usize> {
        if self.grow_pending {
            self.capacity *= 2;
            self.events = Events::with_capacity(self.capacity);
            self.grow_pending = false;
        }

        self.poll.poll(&mut self.events, timeout)?;

        out.clear();
        for event in self.events.iter() {
            out.push(Readiness {
                fd: event.token().0 as RawFd,
                readable: event.is_readable(),
                writable: event.is_writable(),
                // both halves closed = full hangup (RST or dead peer). A
                // half-close FIN is not a hangup: its remaining bytes are
                // delivered by the read drain, which then sees EOF
                hangup: event.is_read_closed() && event.is_write_closed(),
                error: event.is_error(),
            });
        }

        if out.len() == self.capacity {
            self.grow_pending = true;
        }

        Ok(out.len())
    }

    pub fn batch_capacity(&self) -> usize {
        self.capacity
    }
}
