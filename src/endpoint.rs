//! Validated network endpoints.
//!
//! An [`Endpoint`] is the immutable (family, address, port) triple the
//! listener factory and connection bookkeeping work with. The port is
//! validated at construction; the textual address is kept as written and
//! only parsed when a kernel address structure is actually needed.

use crate::error::{Error, Result};
use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Address family of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4 (`AF_INET`)
    V4,
    /// IPv6 (`AF_INET6`)
    V6,
}

impl Family {
    /// Build a family from a raw `AF_*` constant.
    pub fn from_raw(af: i32) -> Result<Self> {
        match af {
            libc::AF_INET => Ok(Family::V4),
            libc::AF_INET6 => Ok(Family::V6),
            other => Err(Error::InvalidFamily(other)),
        }
    }

    /// The raw `AF_*` constant for this family.
    pub fn as_raw(&self) -> i32 {
        match self {
            Family::V4 => libc::AF_INET,
            Family::V6 => libc::AF_INET6,
        }
    }

    pub(crate) fn domain(&self) -> socket2::Domain {
        match self {
            Family::V4 => socket2::Domain::IPV4,
            Family::V6 => socket2::Domain::IPV6,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "ipv4"),
            Family::V6 => write!(f, "ipv6"),
        }
    }
}

/// A validated (family, address, port) triple.
///
/// The address is a textual literal (e.g. `"0.0.0.0"` or `"::1"`); it is not
/// validated here, the caller is responsible for passing a parseable
/// literal. The port must be in `1..=65535` and is checked at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    family: Family,
    address: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint, validating the port range.
    ///
    /// Ports 0 and anything above 65535 are rejected with
    /// [`Error::InvalidPort`].
    pub fn new(family: Family, address: impl Into<String>, port: u32) -> Result<Self> {
        if port == 0 || port > u16::MAX as u32 {
            return Err(Error::InvalidPort(port));
        }
        Ok(Self {
            family,
            address: address.into(),
            port: port as u16,
        })
    }

    /// Shorthand for an IPv4 endpoint.
    pub fn v4(address: impl Into<String>, port: u32) -> Result<Self> {
        Self::new(Family::V4, address, port)
    }

    /// Shorthand for an IPv6 endpoint.
    pub fn v6(address: impl Into<String>, port: u32) -> Result<Self> {
        Self::new(Family::V6, address, port)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Materialize the kernel address for this endpoint.
    ///
    /// This is where the textual address is finally parsed; a bad literal
    /// surfaces here rather than at construction.
    pub fn to_socket_addr(&self) -> std::result::Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Decode an endpoint back out of a kernel address.
    pub fn from_socket_addr(addr: &SocketAddr) -> Self {
        let family = if addr.is_ipv4() { Family::V4 } else { Family::V6 };
        Self {
            family,
            address: addr.ip().to_string(),
            port: addr.port(),
        }
    }

    /// Decode an endpoint from a raw `sockaddr_storage`, as filled in by
    /// `accept`.
    pub(crate) fn from_sockaddr_storage(ss: &libc::sockaddr_storage) -> Result<Self> {
        match ss.ss_family as i32 {
            libc::AF_INET => {
                // SAFETY: ss_family says this is a sockaddr_in.
                let sin = unsafe { &*(ss as *const _ as *const libc::sockaddr_in) };
                let ip = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
                Ok(Self {
                    family: Family::V4,
                    address: ip.to_string(),
                    port: u16::from_be(sin.sin_port),
                })
            }
            libc::AF_INET6 => {
                // SAFETY: ss_family says this is a sockaddr_in6.
                let sin6 = unsafe { &*(ss as *const _ as *const libc::sockaddr_in6) };
                let ip = Ipv6Addr::from(sin6.sin6_addr.s6_addr);
                Ok(Self {
                    family: Family::V6,
                    address: ip.to_string(),
                    port: u16::from_be(sin6.sin6_port),
                })
            }
            other => Err(Error::InvalidFamily(other)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            Family::V4 => write!(f, "{}:{}", self.address, self.port),
            Family::V6 => write!(f, "[{}]:{}", self.address, self.port),
        }
    }
}
