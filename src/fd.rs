//! Owned socket descriptor.

use std::fmt;
use std::os::unix::io::RawFd;

const INVALID_FD: RawFd = -1;

/// Move-only owner of an OS socket descriptor.
///
/// Exactly one `Descriptor` owns a given descriptor at a time; moving the
/// value transfers ownership and dropping it closes the descriptor. A
/// taken-from descriptor holds the invalid sentinel and its drop is a no-op,
/// so every descriptor is closed exactly once.
///
/// Equality and ordering follow the underlying integer, which makes the type
/// usable as a map key or in sorted collections.
pub struct Descriptor {
    fd: RawFd,
}

impl Descriptor {
    /// Wrap a raw descriptor, taking ownership of it.
    pub(crate) fn from_raw(fd: RawFd) -> Self {
        Self { fd }
    }

    /// The raw descriptor value, or the invalid sentinel after `take`.
    pub fn raw(&self) -> RawFd {
        self.fd
    }

    /// Whether this handle currently owns a descriptor.
    pub fn is_valid(&self) -> bool {
        self.fd != INVALID_FD
    }

    /// Release ownership of the raw descriptor, leaving this handle invalid.
    ///
    /// The caller becomes responsible for closing the returned descriptor.
    pub(crate) fn take(&mut self) -> RawFd {
        std::mem::replace(&mut self.fd, INVALID_FD)
    }
}

impl Drop for Descriptor {
    fn drop(&mut self) {
        if self.is_valid() {
            // SAFETY: we are the sole owner of the descriptor.
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.fd == other.fd
    }
}

impl Eq for Descriptor {}

impl PartialOrd for Descriptor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Descriptor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.fd.cmp(&other.fd)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Descriptor({})", self.fd)
        } else {
            write!(f, "Descriptor(invalid)")
        }
    }
}
