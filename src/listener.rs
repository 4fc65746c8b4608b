//! Listening socket construction.

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::fd::Descriptor;
use socket2::{Protocol, Socket, Type};
use std::io;
use std::os::unix::io::{IntoRawFd, RawFd};

/// A bound, listening, non-blocking TCP socket.
///
/// Built by [`Listener::bind`], which applies the options the reactor
/// depends on: `SO_REUSEADDR`, non-blocking mode, and close-on-exec (set by
/// socket creation). Hand the listener to
/// [`Reactor::register_listener`](crate::Reactor::register_listener); the
/// reactor owns it from then on and it closes when the reactor is dropped.
pub struct Listener {
    fd: Descriptor,
    local: Endpoint,
}

impl Listener {
    /// Create a TCP listener bound to `endpoint`.
    ///
    /// `backlog` defaults to the OS maximum (`SOMAXCONN`) when `None`.
    /// Failures report the stage that failed along with the OS error.
    pub fn bind(endpoint: &Endpoint, backlog: Option<u32>) -> Result<Self> {
        let addr = endpoint.to_socket_addr().map_err(|e| Error::ListenerSetupFailed {
            stage: "parse address",
            source: io::Error::new(io::ErrorKind::InvalidInput, e),
        })?;

        let socket = Socket::new(endpoint.family().domain(), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| setup("create socket", e))?;

        socket
            .set_reuse_address(true)
            .map_err(|e| setup("set SO_REUSEADDR", e))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| setup("set non-blocking", e))?;
        socket
            .bind(&addr.into())
            .map_err(|e| setup("bind", e))?;

        let backlog = backlog.unwrap_or(libc::SOMAXCONN as u32);
        socket
            .listen(backlog as i32)
            .map_err(|e| setup("listen", e))?;

        Ok(Self {
            fd: Descriptor::from_raw(socket.into_raw_fd()),
            local: endpoint.clone(),
        })
    }

    /// The endpoint this listener is bound to.
    pub fn local_addr(&self) -> &Endpoint {
        &self.local
    }

    pub(crate) fn raw(&self) -> RawFd {
        self.fd.raw()
    }
}

fn setup(stage: &'static str, source: io::Error) -> Error {
    Error::ListenerSetupFailed { stage, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_port() -> u16 {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap().port()
    }

    #[test]
    fn test_bind_and_accept_readiness() {
        let port = free_port();
        let ep = Endpoint::v4("127.0.0.1", port as u32).unwrap();
        let listener = Listener::bind(&ep, Some(128)).unwrap();
        assert_eq!(listener.local_addr(), &ep);
        assert!(listener.raw() >= 0);

        // the socket really is listening
        let client = std::net::TcpStream::connect(("127.0.0.1", port));
        assert!(client.is_ok());
    }

    #[test]
    fn test_bad_address_reports_stage() {
        let port = free_port();
        let bad = Endpoint::v4("256.0.0.1", port as u32).unwrap();
        match Listener::bind(&bad, None) {
            Err(Error::ListenerSetupFailed { stage, .. }) => {
                assert_eq!(stage, "parse address")
            }
            other => panic!("expected setup failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_nonblocking_accept_would_block() {
        let port = free_port();
        let ep = Endpoint::v4("127.0.0.1", port as u32).unwrap();
        let listener = Listener::bind(&ep, None).unwrap();

        // no pending connection: a non-blocking accept must not hang
        let mut ss: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
        let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        let rc = unsafe {
            libc::accept(
                listener.raw(),
                &mut ss as *mut _ as *mut libc::sockaddr,
                &mut len,
            )
        };
        assert_eq!(rc, -1);
        let err = io::Error::last_os_error();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }
}
