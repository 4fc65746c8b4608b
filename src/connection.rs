//! Accepted connection state.

use crate::endpoint::Endpoint;
use crate::fd::Descriptor;
use crate::handler::ConnToken;
use std::io;
use std::os::unix::io::RawFd;

/// One accepted client connection.
///
/// Owns the accepted descriptor together with the local and remote
/// endpoints. The raw `send`/`recv` here are used by the reactor's flush and
/// drain paths; embedders interact with connections through
/// [`ReactorCtx`](crate::ReactorCtx) instead.
pub struct Connection {
    fd: Descriptor,
    local: Endpoint,
    peer: Endpoint,
    open: bool,
}

impl Connection {
    pub(crate) fn new(fd: Descriptor, local: Endpoint, peer: Endpoint) -> Self {
        Self {
            fd,
            local,
            peer,
            open: true,
        }
    }

    /// The token identifying this connection in callbacks.
    pub fn token(&self) -> ConnToken {
        ConnToken(self.fd.raw())
    }

    /// The local (listener-side) endpoint.
    pub fn local_addr(&self) -> &Endpoint {
        &self.local
    }

    /// The remote peer's endpoint.
    pub fn peer_addr(&self) -> &Endpoint {
        &self.peer
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn mark_closed(&mut self) {
        self.open = false;
    }

    pub(crate) fn raw(&self) -> RawFd {
        self.fd.raw()
    }

    /// Non-blocking read into `buf`. Returns `Ok(0)` on peer EOF and
    /// `WouldBlock` once the socket is drained.
    pub(crate) fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: buf is a valid writable region of buf.len() bytes.
        let n = unsafe {
            libc::recv(
                self.fd.raw(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
            )
        };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(n as usize)
        }
    }

    /// Non-blocking write of `buf`, suppressing SIGPIPE. May send fewer
    /// bytes than requested when the kernel buffer fills.
    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<usize> {
        #[cfg(target_os = "linux")]
        const FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
        // SO_NOSIGPIPE is applied at accept on platforms without MSG_NOSIGNAL
        #[cfg(not(target_os = "linux"))]
        const FLAGS: libc::c_int = 0;

        // SAFETY: buf is a valid readable region of buf.len() bytes.
        let n = unsafe {
            libc::send(
                self.fd.raw(),
                buf.as_ptr() as *const libc::c_void,
                buf.len(),
                FLAGS,
            )
        };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(n as usize)
        }
    }
}
