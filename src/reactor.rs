//! Reactor event loop.
//!
//! A single thread owns the poller, the listener, the connection table, and
//! the embedder's [`EventHandler`]; it blocks only in the poller wait and
//! dispatches readiness to the accept, read-drain, write-flush, and close
//! paths. Every I/O call is non-blocking: "would block" hands control back
//! to the loop.
//!
//! Two disciplines keep the loop correct under edge-triggered readiness:
//! sockets are always drained (read or written) until the kernel reports
//! "would block", and application close requests are deferred to the loop so
//! queued writes flush before the descriptor goes away.

use crate::connection::Connection;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::fd::Descriptor;
use crate::handler::{ConnToken, EventHandler};
use crate::listener::Listener;
use crate::metrics::{
    ACCEPT_BACKOFFS, BYTES_RECEIVED, BYTES_SENT, CONNECTIONS_ACCEPTED, CONNECTIONS_ACTIVE,
    CONNECTIONS_CLOSED,
};
use crate::poller::{INITIAL_BATCH_CAPACITY, Poller, Readiness};
use bytes::{Buf, Bytes};
use mio::Interest;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::unix::io::RawFd;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Requests a stop of a running reactor.
///
/// Cloneable and sendable; the store is a single atomic write, safe from
/// other threads and from signal handlers. The loop observes the flag when
/// its current wait returns, bounded by the idle timeout passed to
/// [`Reactor::run`].
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-connection reactor state.
struct ConnState {
    conn: Connection,
    /// Pending outbound chunks, FIFO. The head may be partially sent; its
    /// sent prefix is trimmed in place.
    outq: VecDeque<Bytes>,
    /// True iff the poller currently monitors this descriptor for write
    /// readiness.
    want_write: bool,
    /// True once closure has been requested; teardown is deferred until the
    /// write queue drains.
    want_close: bool,
}

enum FlushOutcome {
    /// The queue is empty.
    Drained,
    /// The kernel buffer filled; unsent bytes remain queued.
    Blocked,
    /// The write side failed; nothing further can be sent.
    Failed(Error),
}

/// Reactor state shared with callbacks through [`ReactorCtx`].
pub(crate) struct Core {
    // field order is teardown order: connections, then listener, then poller
    table: HashMap<RawFd, ConnState>,
    listener: Option<Listener>,
    poller: Poller,
    close_queue: Vec<RawFd>,
    stop: Arc<AtomicBool>,
}

impl Core {
    /// Queue bytes for transmission and arm write readiness.
    fn enqueue(&mut self, fd: RawFd, data: Bytes) {
        if data.is_empty() {
            return;
        }
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        st.outq.push_back(data);
        self.set_write_interest(fd, true);
    }

    /// Mark a connection for deferred closure. Idempotent.
    fn request_close(&mut self, fd: RawFd) {
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        if st.want_close {
            return;
        }
        st.want_close = true;
        self.close_queue.push(fd);
    }

    fn set_write_interest(&mut self, fd: RawFd, on: bool) {
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        if st.want_write == on {
            return;
        }
        st.want_write = on;
        let interest = if on {
            Interest::READABLE | Interest::WRITABLE
        } else {
            Interest::READABLE
        };
        if let Err(e) = self.poller.modify(fd, interest) {
            tracing::debug!(fd, error = %e, "failed to update poller interest");
        }
    }

    /// Send queued chunks until the queue empties or the kernel pushes back.
    fn flush_writes(&mut self, fd: RawFd) -> FlushOutcome {
        let Some(st) = self.table.get_mut(&fd) else {
            return FlushOutcome::Drained;
        };
        loop {
            let Some(front) = st.outq.front_mut() else {
                return FlushOutcome::Drained;
            };
            if front.is_empty() {
                st.outq.pop_front();
                continue;
            }
            match st.conn.send(&front[..]) {
                Ok(n) => {
                    BYTES_SENT.add(n as u64);
                    if n < front.len() {
                        // partial write: trim the sent prefix, retry later
                        front.advance(n);
                        return FlushOutcome::Blocked;
                    }
                    st.outq.pop_front();
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return FlushOutcome::Blocked,
                Err(e) => {
                    return FlushOutcome::Failed(Error::ConnectionIo {
                        fd,
                        op: "send",
                        source: e,
                    });
                }
            }
        }
    }

    /// Discard unsendable queued bytes so a pending close can proceed.
    fn abandon_writes(&mut self, fd: RawFd) {
        let Some(st) = self.table.get_mut(&fd) else {
            return;
        };
        st.outq.clear();
        self.set_write_interest(fd, false);
    }
}

/// Capabilities handed to [`EventHandler`] callbacks.
///
/// All operations target the reactor that invoked the callback and take
/// effect on its I/O thread. Operations on a token whose connection has
/// already closed are no-ops.
pub struct ReactorCtx<'a> {
    core: &'a mut Core,
}

impl ReactorCtx<'_> {
    /// Queue bytes for asynchronous delivery to `conn`.
    ///
    /// Chunks are transmitted in enqueue order; a partial write is resumed
    /// before any later chunk. Queued bytes survive a subsequent
    /// [`close`](Self::close): the connection tears down only after the
    /// queue drains.
    pub fn send(&mut self, conn: ConnToken, data: impl Into<Bytes>) {
        self.core.enqueue(conn.0, data.into());
    }

    /// Request closure of `conn`.
    ///
    /// Deferred: the loop tears the connection down on a following
    /// iteration, once queued writes have been handed to the kernel.
    /// Idempotent.
    pub fn close(&mut self, conn: ConnToken) {
        self.core.request_close(conn.0);
    }

    /// Request a stop of the event loop. Equivalent to
    /// [`StopHandle::stop`].
    pub fn stop(&self) {
        self.core.stop.store(true, Ordering::SeqCst);
    }

    /// The connection behind `conn`, while it is open.
    pub fn connection(&self, conn: ConnToken) -> Option<&Connection> {
        self.core.table.get(&conn.0).map(|st| &st.conn)
    }

    /// The peer endpoint of `conn`, while it is open.
    pub fn peer_addr(&self, conn: ConnToken) -> Option<&Endpoint> {
        self.core.table.get(&conn.0).map(|st| st.conn.peer_addr())
    }

    /// The local endpoint of `conn`, while it is open.
    pub fn local_addr(&self, conn: ConnToken) -> Option<&Endpoint> {
        self.core.table.get(&conn.0).map(|st| st.conn.local_addr())
    }

    /// The endpoint of the registered listener, if any.
    pub fn listener_addr(&self) -> Option<&Endpoint> {
        self.core.listener.as_ref().map(|l| l.local_addr())
    }

    /// Number of currently open connections.
    pub fn open_connections(&self) -> usize {
        self.core.table.len()
    }
}

/// Builder for [`Reactor`].
#[derive(Debug, Clone)]
pub struct ReactorBuilder {
    max_fds: Option<u64>,
    batch_capacity: usize,
    read_buffer_size: usize,
}

impl Default for ReactorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactorBuilder {
    pub fn new() -> Self {
        Self {
            max_fds: None,
            batch_capacity: INITIAL_BATCH_CAPACITY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// Raise `RLIMIT_NOFILE` to `limit` during build. Failure to raise the
    /// limit is logged and otherwise ignored.
    pub fn max_fds(mut self, limit: u64) -> Self {
        self.max_fds = Some(limit);
        self
    }

    /// Initial readiness batch capacity (default 4096). The batch doubles
    /// whenever a wait saturates it.
    pub fn batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Size of the read-drain buffer (default 64 KiB). This bounds the
    /// largest chunk a single `on_message` call can deliver.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Build a reactor around `handler`.
    ///
    /// Fails only when the readiness poller cannot be created.
    pub fn build<H: EventHandler>(self, handler: H) -> Result<Reactor<H>> {
        if let Some(limit) = self.max_fds {
            raise_fd_limit(limit);
        }
        let poller = Poller::new(self.batch_capacity.max(1))?;
        Ok(Reactor {
            core: Core {
                table: HashMap::new(),
                listener: None,
                poller,
                close_queue: Vec::new(),
                stop: Arc::new(AtomicBool::new(false)),
            },
            handler,
            recv_buf: vec![0u8; self.read_buffer_size.max(1)].into_boxed_slice(),
            batch: Vec::new(),
        })
    }
}

fn raise_fd_limit(limit: u64) {
    let rl = libc::rlimit {
        rlim_cur: limit,
        rlim_max: limit,
    };
    // SAFETY: rl is a fully initialized rlimit value.
    let rc = unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &rl) };
    if rc != 0 {
        tracing::warn!(
            limit,
            error = %io::Error::last_os_error(),
            "could not raise RLIMIT_NOFILE, continuing with the current limit"
        );
    }
}

/// The event loop: accepts connections, drains reads, flushes writes, and
/// invokes the embedder's [`EventHandler`], all on the calling thread.
///
/// Not thread-safe: all mutation happens on the thread inside
/// [`run`](Self::run). The single cross-thread entry point is the stop flag
/// (see [`StopHandle`]). Work that must happen off-thread is handed back via
/// a queue drained in [`EventHandler::on_tick`].
pub struct Reactor<H: EventHandler> {
    core: Core,
    handler: H,
    recv_buf: Box<[u8]>,
    batch: Vec<Readiness>,
}

impl<H: EventHandler> Reactor<H> {
    pub fn builder() -> ReactorBuilder {
        ReactorBuilder::new()
    }

    /// Build a reactor with default settings.
    pub fn new(handler: H) -> Result<Self> {
        ReactorBuilder::new().build(handler)
    }

    /// Register the listening socket, arming it for edge-triggered read
    /// readiness. At most one listener per reactor.
    pub fn register_listener(&mut self, listener: Listener) -> Result<()> {
        if self.core.listener.is_some() {
            return Err(Error::RegisterFailed {
                fd: listener.raw(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "listener already registered"),
            });
        }
        self.core
            .poller
            .add(listener.raw(), Interest::READABLE)
            .map_err(|e| Error::RegisterFailed {
                fd: listener.raw(),
                source: e,
            })?;
        self.core.listener = Some(listener);
        Ok(())
    }

    /// The endpoint of the registered listener, if any.
    pub fn listener_addr(&self) -> Option<&Endpoint> {
        self.core.listener.as_ref().map(|l| l.local_addr())
    }

    /// A handle for stopping the loop from another thread or a signal
    /// handler.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: self.core.stop.clone(),
        }
    }

    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.core.stop.store(true, Ordering::SeqCst);
    }

    /// Number of currently open connections.
    pub fn open_connections(&self) -> usize {
        self.core.table.len()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the reactor, returning the handler. Remaining connections,
    /// the listener, and the poller close here.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Run the event loop on the calling thread.
    ///
    /// `idle_timeout` bounds each poller wait; [`EventHandler::on_tick`]
    /// runs before every wait, and a stop request is observed at the latest
    /// one idle timeout after it is made. `None` blocks waits indefinitely,
    /// leaving stop observation to readiness traffic.
    ///
    /// Invokes [`EventHandler::on_listen`] before the first wait and
    /// [`EventHandler::on_shutdown`] after the loop exits. Returns an error
    /// only for a fatal poller failure, which is also reported through
    /// [`EventHandler::on_error`] before the loop winds down.
    pub fn run(&mut self, idle_timeout: Option<Duration>) -> Result<()> {
        self.handler.on_listen(&mut ReactorCtx {
            core: &mut self.core,
        });

        let mut fatal = None;
        while !self.core.stop.load(Ordering::Relaxed) {
            self.handler.on_tick(&mut ReactorCtx {
                core: &mut self.core,
            });

            match self.core.poller.wait(&mut self.batch, idle_timeout) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let err = Error::FatalLoop(e);
                    self.handler.on_error(
                        &mut ReactorCtx {
                            core: &mut self.core,
                        },
                        &err,
                    );
                    fatal = Some(err);
                    break;
                }
            }

            let listener_fd = self.core.listener.as_ref().map(|l| l.raw());
            for i in 0..self.batch.len() {
                let ev = self.batch[i];
                if Some(ev.fd) == listener_fd {
                    self.accept_loop();
                    continue;
                }
                self.dispatch(ev);
            }

            // retry accepts that bailed out earlier (e.g. descriptor
            // exhaustion); also keeps already-accepted connections ahead of
            // accept storms, since reads were dispatched first
            if listener_fd.is_some() {
                self.accept_loop();
            }

            self.drain_close_queue();
        }

        self.handler.on_shutdown(&mut ReactorCtx {
            core: &mut self.core,
        });

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Accept until the listener reports "would block".
    fn accept_loop(&mut self) {
        let (lfd, local) = match &self.core.listener {
            Some(l) => (l.raw(), l.local_addr().clone()),
            None => return,
        };

        loop {
            let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
            let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
            let cfd = accept_nonblocking(lfd, &mut storage, &mut len);
            if cfd < 0 {
                let e = io::Error::last_os_error();
                match e.kind() {
                    io::ErrorKind::WouldBlock => return,
                    io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted => continue,
                    _ => {
                        // EMFILE/ENFILE and friends: report, leave the
                        // backlog queued, retry next iteration
                        ACCEPT_BACKOFFS.increment();
                        let err = Error::AcceptSaturated(e);
                        self.handler.on_error(
                            &mut ReactorCtx {
                                core: &mut self.core,
                            },
                            &err,
                        );
                        return;
                    }
                }
            }

            let fd = Descriptor::from_raw(cfd);
            let peer = match Endpoint::from_sockaddr_storage(&storage) {
                Ok(p) => p,
                Err(err) => {
                    self.handler.on_error(
                        &mut ReactorCtx {
                            core: &mut self.core,
                        },
                        &err,
                    );
                    continue; // descriptor closes on drop
                }
            };

            if let Err(e) = self.core.poller.add(cfd, Interest::READABLE) {
                let err = Error::RegisterFailed { fd: cfd, source: e };
                self.handler.on_error(
                    &mut ReactorCtx {
                        core: &mut self.core,
                    },
                    &err,
                );
                continue; // descriptor closes on drop
            }

            let conn = Connection::new(fd, local.clone(), peer);
            self.core.table.insert(
                cfd,
                ConnState {
                    conn,
                    outq: VecDeque::new(),
                    want_write: false,
                    want_close: false,
                },
            );
            CONNECTIONS_ACCEPTED.increment();
            CONNECTIONS_ACTIVE.increment();
            tracing::trace!(fd = cfd, "accepted connection");

            self.handler.on_open(
                &mut ReactorCtx {
                    core: &mut self.core,
                },
                ConnToken(cfd),
            );
        }
    }

    /// Dispatch one readiness record for an established connection.
    fn dispatch(&mut self, ev: Readiness) {
        let fd = ev.fd;
        let Some(st) = self.core.table.get(&fd) else {
            return; // closed earlier in this batch
        };

        // opportunistic flush ahead of the read: often drains the queue
        // without a write-readiness round trip through the poller
        if !st.outq.is_empty() {
            self.flush_and_rearm(fd);
        }

        if ev.writable {
            self.flush_and_rearm(fd);
        }

        if ev.error || ev.hangup {
            match self.core.table.get(&fd) {
                None => return,
                Some(st) if !st.want_write => {
                    self.close_and_erase(fd);
                    return;
                }
                // queue not drained yet: keep flushing best-effort and
                // consummate the close when the write side settles
                Some(_) => self.core.request_close(fd),
            }
        }

        if ev.readable {
            self.read_drain(fd);
        }
    }

    /// Read until the kernel reports "would block", handing each chunk to
    /// the handler. Required under edge-triggered readiness: an incomplete
    /// drain would swallow the next notification.
    fn read_drain(&mut self, fd: RawFd) {
        loop {
            let result = match self.core.table.get(&fd) {
                None => return,
                Some(st) if st.want_close => return,
                Some(st) => st.conn.recv(&mut self.recv_buf),
            };

            match result {
                Ok(0) => {
                    // peer closed
                    self.core.request_close(fd);
                    return;
                }
                Ok(n) => {
                    BYTES_RECEIVED.add(n as u64);
                    self.handler.on_message(
                        &mut ReactorCtx {
                            core: &mut self.core,
                        },
                        ConnToken(fd),
                        &self.recv_buf[..n],
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) => {
                    let err = Error::ConnectionIo {
                        fd,
                        op: "recv",
                        source: e,
                    };
                    self.handler.on_error(
                        &mut ReactorCtx {
                            core: &mut self.core,
                        },
                        &err,
                    );
                    self.core.request_close(fd);
                    return;
                }
            }
        }
    }

    /// Flush the output queue and toggle write interest to match.
    fn flush_and_rearm(&mut self, fd: RawFd) {
        match self.core.flush_writes(fd) {
            FlushOutcome::Drained => self.core.set_write_interest(fd, false),
            FlushOutcome::Blocked => self.core.set_write_interest(fd, true),
            FlushOutcome::Failed(err) => {
                self.handler.on_error(
                    &mut ReactorCtx {
                        core: &mut self.core,
                    },
                    &err,
                );
                // the write side is dead; drop the queue so a pending close
                // is not stranded behind bytes that can never be sent
                self.core.abandon_writes(fd);
                self.core.request_close(fd);
            }
        }
    }

    /// Tear down a connection: deregister, notify, erase. The descriptor
    /// closes when the table entry drops, after `on_close` returns.
    fn close_and_erase(&mut self, fd: RawFd) {
        if !self.core.table.contains_key(&fd) {
            return;
        }
        if let Err(e) = self.core.poller.remove(fd) {
            tracing::debug!(fd, error = %e, "failed to deregister descriptor");
        }
        if let Some(st) = self.core.table.get_mut(&fd) {
            st.conn.mark_closed();
        }
        self.handler.on_close(
            &mut ReactorCtx {
                core: &mut self.core,
            },
            ConnToken(fd),
        );
        if self.core.table.remove(&fd).is_some() {
            CONNECTIONS_ACTIVE.decrement();
            CONNECTIONS_CLOSED.increment();
            tracing::trace!(fd, "closed connection");
        }
    }

    /// Consummate deferred closes whose write queues have drained; the rest
    /// stay queued for a later iteration.
    fn drain_close_queue(&mut self) {
        if self.core.close_queue.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.core.close_queue);
        for fd in pending {
            match self.core.table.get(&fd) {
                None => {}
                // descriptor value was reused by a newer connection
                Some(st) if !st.want_close => {}
                Some(st) if st.want_write => self.core.close_queue.push(fd),
                Some(_) => self.close_and_erase(fd),
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn accept_nonblocking(
    lfd: RawFd,
    storage: &mut libc::sockaddr_storage,
    len: &mut libc::socklen_t,
) -> RawFd {
    // SAFETY: storage/len describe a valid sockaddr_storage buffer.
    unsafe {
        libc::accept4(
            lfd,
            storage as *mut _ as *mut libc::sockaddr,
            len,
            libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        )
    }
}

/// Platforms without `accept4`: plain accept followed by explicit flag
/// sets, treated as equivalent.
#[cfg(not(target_os = "linux"))]
fn accept_nonblocking(
    lfd: RawFd,
    storage: &mut libc::sockaddr_storage,
    len: &mut libc::socklen_t,
) -> RawFd {
    // SAFETY: storage/len describe a valid sockaddr_storage buffer.
    let fd = unsafe { libc::accept(lfd, storage as *mut _ as *mut libc::sockaddr, len) };
    if fd >= 0 {
        // SAFETY: fd is a freshly accepted socket we own.
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL);
            libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
            let fdflags = libc::fcntl(fd, libc::F_GETFD);
            libc::fcntl(fd, libc::F_SETFD, fdflags | libc::FD_CLOEXEC);
            #[cfg(any(
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "netbsd"
            ))]
            {
                let one: libc::c_int = 1;
                libc::setsockopt(
                    fd,
                    libc::SOL_SOCKET,
                    libc::SO_NOSIGPIPE,
                    &one as *const _ as *const libc::c_void,
                    std::mem::size_of::<libc::c_int>() as libc::socklen_t,
                );
            }
        }
    }
    fd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHandler {
        calls: Vec<&'static str>,
    }

    impl EventHandler for RecordingHandler {
        fn on_listen(&mut self, ctx: &mut ReactorCtx) {
            // operations on unknown tokens are no-ops
            let ghost = ConnToken::from_raw(999_999);
            ctx.send(ghost, Bytes::from_static(b"nobody home"));
            ctx.close(ghost);
            assert_eq!(ctx.open_connections(), 0);
            assert!(ctx.peer_addr(ghost).is_none());
            self.calls.push("listen");
        }

        fn on_shutdown(&mut self, _ctx: &mut ReactorCtx) {
            self.calls.push("shutdown");
        }

        fn on_tick(&mut self, _ctx: &mut ReactorCtx) {
            self.calls.push("tick");
        }
    }

    #[test]
    fn test_prestopped_run_calls_listen_and_shutdown_only() {
        let mut reactor = Reactor::new(RecordingHandler::default()).unwrap();
        reactor.stop();
        reactor.run(Some(Duration::from_millis(10))).unwrap();
        let handler = reactor.into_handler();
        assert_eq!(handler.calls, vec!["listen", "shutdown"]);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let reactor = Reactor::new(RecordingHandler::default()).unwrap();
        let handle = reactor.stop_handle();
        assert!(!handle.is_stopped());
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_at_most_one_listener() {
        use crate::endpoint::Endpoint;
        use crate::listener::Listener;

        // hold both probes at once so the ports are distinct
        let probe_a = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let probe_b = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port_a = probe_a.local_addr().unwrap().port();
        let port_b = probe_b.local_addr().unwrap().port();
        drop(probe_a);
        drop(probe_b);

        let mut reactor = Reactor::new(RecordingHandler::default()).unwrap();
        let a = Listener::bind(&Endpoint::v4("127.0.0.1", port_a as u32).unwrap(), None).unwrap();
        let b = Listener::bind(&Endpoint::v4("127.0.0.1", port_b as u32).unwrap(), None).unwrap();

        reactor.register_listener(a).unwrap();
        assert!(matches!(
            reactor.register_listener(b),
            Err(Error::RegisterFailed { .. })
        ));
        assert_eq!(
            reactor.listener_addr().map(|e| e.port()),
            Some(port_a)
        );
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ReactorBuilder::new();
        let reactor = builder
            .batch_capacity(128)
            .read_buffer_size(8 * 1024)
            .build(RecordingHandler::default())
            .unwrap();
        assert_eq!(reactor.open_connections(), 0);
    }
}
