use crate::round_capacity;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("write of {len} bytes at offset {offset} exceeds the buffer size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
}

/// A growable byte buffer with a logical size and geometric capacity growth.
///
/// Capacity requests are rounded up in `2ⁿ - 1` steps (see
/// [`round_capacity`]), matching the other growable containers in this
/// crate. The logical size only changes through [`ByteBuffer::resize`],
/// [`ByteBuffer::append`] and [`ByteBuffer::clear`]; random-access writes
/// through [`ByteBuffer::write_at`] must land inside the current size and
/// fail otherwise, without touching the contents.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(round_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Ensures room for at least `capacity` total bytes, rounding the
    /// request up. No-op if the buffer is already large enough.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.data.capacity() {
            let rounded = round_capacity(capacity);
            self.data.reserve(rounded - self.data.len());
        }
    }

    /// Grows or shrinks the logical size. New bytes are zeroed.
    pub fn resize(&mut self, new_len: usize) {
        self.reserve(new_len);
        self.data.resize(new_len, 0);
    }

    /// Appends bytes at the end, growing capacity geometrically.
    pub fn append(&mut self, bytes: &[u8]) {
        self.reserve(self.data.len() + bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Overwrites bytes at `offset`. The write must fit entirely within the
    /// current logical size.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), BufferError> {
        let end = offset.checked_add(bytes.len());
        match end {
            Some(end) if end <= self.data.len() => {
                self.data[offset..end].copy_from_slice(bytes);
                Ok(())
            }
            _ => Err(BufferError::OutOfBounds {
                offset,
                len: bytes.len(),
                size: self.data.len(),
            }),
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up() {
        let buf = ByteBuffer::with_capacity(100);
        assert!(buf.capacity() >= 127);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn resize_zero_fills() {
        let mut buf = ByteBuffer::new();
        buf.resize(16);
        assert_eq!(buf.len(), 16);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn write_at_respects_bounds() {
        let mut buf = ByteBuffer::new();
        buf.resize(8);

        assert!(buf.write_at(4, &[1, 2, 3, 4]).is_ok());
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0, 1, 2, 3, 4]);

        let err = buf.write_at(6, &[9, 9, 9]).unwrap_err();
        assert!(matches!(err, BufferError::OutOfBounds { .. }));
        // rejected writes leave the contents alone
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn append_grows() {
        let mut buf = ByteBuffer::new();
        for _ in 0..10 {
            buf.append(&[0xAB; 10]);
        }
        assert_eq!(buf.len(), 100);
        assert!(buf.capacity() >= 100);
    }
}
