use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("operation would leave the cursor outside the stream bounds")]
    OutOfBounds,
}

/// Reference point for [`BinStream::seek`] offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Begin,
    Current,
    End,
}

/// Computes a new cursor position, keeping it within `[0, len]`. Fails
/// without producing a position if the combination lands outside.
fn resolve_seek(
    len: usize,
    position: usize,
    origin: SeekOrigin,
    offset: i64,
) -> Result<usize, StreamError> {
    let base = match origin {
        SeekOrigin::Begin => 0i64,
        SeekOrigin::Current => position as i64,
        SeekOrigin::End => len as i64,
    };
    let target = base.checked_add(offset).ok_or(StreamError::OutOfBounds)?;
    if target < 0 || target > len as i64 {
        Err(StreamError::OutOfBounds)
    } else {
        Ok(target as usize)
    }
}

/// A bounded binary cursor over caller-owned, writable memory.
///
/// The stream never owns the underlying bytes and never grows them; its
/// position always satisfies `0 <= position <= len`, starting at 0. Writes
/// that would run past the end are rejected whole, leaving both the cursor
/// and the contents untouched.
///
/// [`std::io::Read`], [`Write`](std::io::Write) and [`Seek`](std::io::Seek)
/// are implemented so `byteorder`'s extension traits work directly on it.
///
/// ## Example
/// ```
/// use byteorder::{ReadBytesExt, WriteBytesExt, LE};
/// use talon_utils::{BinStream, SeekOrigin};
///
/// let mut backing = [0u8; 8];
/// let mut stream = BinStream::new(&mut backing);
/// stream.write_u32::<LE>(0xDEAD_BEEF).unwrap();
/// stream.seek(SeekOrigin::Begin, 0).unwrap();
/// assert_eq!(stream.read_u32::<LE>().unwrap(), 0xDEAD_BEEF);
/// ```
#[derive(Debug)]
pub struct BinStream<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl<'a> BinStream<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Moves the cursor relative to the given origin. Returns the new
    /// position; a failing seek leaves the cursor where it was.
    pub fn seek(&mut self, origin: SeekOrigin, offset: i64) -> Result<usize, StreamError> {
        self.position = resolve_seek(self.data.len(), self.position, origin, offset)?;
        Ok(self.position)
    }

    /// Writes all of `bytes` at the cursor, advancing it. Rejected outright
    /// if the write would pass the end of the stream.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, StreamError> {
        let end = self
            .position
            .checked_add(bytes.len())
            .ok_or(StreamError::OutOfBounds)?;
        if end > self.data.len() {
            return Err(StreamError::OutOfBounds);
        }
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(bytes.len())
    }

    /// Copies up to `buf.len()` bytes from the cursor, advancing it.
    /// Returns how many bytes were copied; 0 at the end of the stream.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = self.remaining().min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        n
    }
}

impl io::Read for BinStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(BinStream::read(self, buf))
    }
}

impl io::Write for BinStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BinStream::write(self, buf)
            .map_err(|e| io::Error::new(io::ErrorKind::WriteZero, e))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for BinStream<'_> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (origin, offset) = split_seek_from(pos);
        BinStream::seek(self, origin, offset)
            .map(|p| p as u64)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

/// Read-only twin of [`BinStream`], for cursoring over shared byte slices.
#[derive(Debug, Clone)]
pub struct BinReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn seek(&mut self, origin: SeekOrigin, offset: i64) -> Result<usize, StreamError> {
        self.position = resolve_seek(self.data.len(), self.position, origin, offset)?;
        Ok(self.position)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = self.remaining().min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        n
    }
}

impl io::Read for BinReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(BinReader::read(self, buf))
    }
}

impl io::Seek for BinReader<'_> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (origin, offset) = split_seek_from(pos);
        BinReader::seek(self, origin, offset)
            .map(|p| p as u64)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

fn split_seek_from(pos: io::SeekFrom) -> (SeekOrigin, i64) {
    match pos {
        io::SeekFrom::Start(n) => (SeekOrigin::Begin, n as i64),
        io::SeekFrom::Current(n) => (SeekOrigin::Current, n),
        io::SeekFrom::End(n) => (SeekOrigin::End, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ReadBytesExt, WriteBytesExt, LE};

    #[test]
    fn fresh_stream_starts_at_zero() {
        let mut backing = [0u8; 4];
        let stream = BinStream::new(&mut backing);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.remaining(), 4);
    }

    #[test]
    fn seek_from_every_origin() {
        let mut backing = [0u8; 10];
        let mut stream = BinStream::new(&mut backing);

        assert_eq!(stream.seek(SeekOrigin::Begin, 4), Ok(4));
        assert_eq!(stream.seek(SeekOrigin::Current, 3), Ok(7));
        assert_eq!(stream.seek(SeekOrigin::Current, -5), Ok(2));
        assert_eq!(stream.seek(SeekOrigin::End, -1), Ok(9));
        assert_eq!(stream.seek(SeekOrigin::End, 0), Ok(10));
    }

    #[test]
    fn failed_seek_leaves_position_unchanged() {
        let mut backing = [0u8; 10];
        let mut stream = BinStream::new(&mut backing);
        stream.seek(SeekOrigin::Begin, 5).unwrap();

        assert_eq!(stream.seek(SeekOrigin::Begin, 11), Err(StreamError::OutOfBounds));
        assert_eq!(stream.seek(SeekOrigin::Current, -6), Err(StreamError::OutOfBounds));
        assert_eq!(stream.seek(SeekOrigin::End, 1), Err(StreamError::OutOfBounds));
        assert_eq!(stream.position(), 5);
    }

    #[test]
    fn overflowing_write_is_rejected_whole() {
        let mut backing = [0u8; 4];
        let mut stream = BinStream::new(&mut backing);
        stream.write(&[1, 2]).unwrap();

        assert_eq!(stream.write(&[3, 4, 5]), Err(StreamError::OutOfBounds));
        assert_eq!(stream.position(), 2);

        assert_eq!(stream.write(&[3, 4]), Ok(2));
        assert_eq!(backing, [1, 2, 3, 4]);
    }

    #[test]
    fn read_stops_at_the_end() {
        let data = [1u8, 2, 3];
        let mut reader = BinReader::new(&data);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf), 3);
        assert_eq!(reader.read(&mut buf), 0);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn byteorder_round_trip() {
        let mut backing = [0u8; 12];
        let mut stream = BinStream::new(&mut backing);
        stream.write_u32::<LE>(0xCAFE_F00D).unwrap();
        stream.write_f32::<LE>(1.5).unwrap();
        stream.write_i32::<LE>(-7).unwrap();

        // the backing store is full now; byteorder writes must fail cleanly
        assert!(stream.write_u8(0).is_err());

        let mut reader = BinReader::new(&backing);
        assert_eq!(reader.read_u32::<LE>().unwrap(), 0xCAFE_F00D);
        assert_eq!(reader.read_f32::<LE>().unwrap(), 1.5);
        assert_eq!(reader.read_i32::<LE>().unwrap(), -7);
    }
}
