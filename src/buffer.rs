//! Growable binary-safe byte buffer.

use bytes::{Bytes, BytesMut};

/// A growable byte container for assembling outbound messages.
///
/// Binary-safe: the contents may include NUL and any other byte value.
/// Freeze the buffer into [`Bytes`] to hand it to
/// [`ReactorCtx::send`](crate::ReactorCtx::send) without copying.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    inner: BytesMut,
}

impl Buffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
        }
    }

    /// Append bytes to the end of the buffer.
    pub fn append(&mut self, data: &[u8]) {
        self.inner.extend_from_slice(data);
    }

    /// Number of bytes currently stored.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove all data, keeping the allocation.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// View the contents as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Copy the contents out into an owned vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.to_vec()
    }

    /// Convert into an immutable [`Bytes`] handle without copying.
    pub fn freeze(self) -> Bytes {
        self.inner.freeze()
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        let mut buf = Buffer::with_capacity(data.len());
        buf.append(data);
        buf
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            inner: BytesMut::from(&data[..]),
        }
    }
}

impl From<Buffer> for Bytes {
    fn from(buf: Buffer) -> Self {
        buf.freeze()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_len() {
        let mut buf = Buffer::new();
        assert!(buf.is_empty());
        buf.append(b"hello");
        buf.append(b" world");
        assert_eq!(buf.len(), 11);
        assert_eq!(buf.as_slice(), b"hello world");
    }

    #[test]
    fn test_binary_safe() {
        let mut buf = Buffer::new();
        buf.append(&[0x48, 0x00, 0xff, 0x00]);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.to_vec(), vec![0x48, 0x00, 0xff, 0x00]);
    }

    #[test]
    fn test_clear() {
        let mut buf = Buffer::from(b"data".as_slice());
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_freeze() {
        let mut buf = Buffer::new();
        buf.append(b"frozen");
        let bytes: Bytes = buf.into();
        assert_eq!(&bytes[..], b"frozen");
    }

    #[test]
    fn test_from_vec() {
        let buf = Buffer::from(vec![1u8, 2, 3]);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
    }
}
