//! Payload copying with a reusable buffer.
//!
//! Read errors and write errors are reported differently: a failing reader
//! means the archive is damaged, a failing writer means the filesystem is.

use std::io;
use std::io::Read;
use std::io::Write;

use crate::ArchiveError;
use crate::Result;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused for every payload of one operation.
///
/// # Examples
///
/// ```
/// use coffer_core::copy::{CopyBuffer, copy_exact};
///
/// let mut buffer = CopyBuffer::new();
/// let mut out = Vec::new();
/// let copied = copy_exact(&mut &b"hello"[..], &mut out, 5, &mut buffer)?;
/// assert_eq!(copied, 5);
/// # Ok::<(), coffer_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Creates a new 64 KiB buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies exactly `expected` bytes of an entry payload into `writer`.
///
/// # Errors
///
/// - [`ArchiveError::CorruptContainer`] if the reader fails or ends early.
/// - [`ArchiveError::Io`] if the writer fails.
pub fn copy_exact<R, W>(
    reader: &mut R,
    writer: &mut W,
    expected: u64,
    buffer: &mut CopyBuffer,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut total: u64 = 0;

    while total < expected {
        let remaining = expected - total;
        let want = usize::try_from(remaining).map_or(buffer.buf.len(), |r| r.min(buffer.buf.len()));
        let read = match reader.read(&mut buffer.buf[..want]) {
            Ok(0) => {
                return Err(ArchiveError::CorruptContainer(format!(
                    "truncated payload: expected {expected} bytes, got {total}"
                )));
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::corrupt(e)),
        };

        writer.write_all(&buffer.buf[..read])?;
        total += read as u64;
    }

    Ok(total)
}

/// Checks that `reader` has nothing left after its recorded size.
///
/// Zip readers only compare the CRC-32 once they hit end of stream, so the
/// extra read is what surfaces a checksum mismatch.
///
/// # Errors
///
/// Returns [`ArchiveError::CorruptContainer`] if the reader fails or still
/// has data.
pub fn expect_end<R: Read + ?Sized>(reader: &mut R) -> Result<()> {
    let mut probe = [0u8; 1];
    loop {
        match reader.read(&mut probe) {
            Ok(0) => return Ok(()),
            Ok(_) => {
                return Err(ArchiveError::CorruptContainer(
                    "payload is longer than its recorded size".to_string(),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ArchiveError::corrupt(e)),
        }
    }
}

/// Reads a payload to its end and returns its length.
///
/// # Errors
///
/// Returns [`ArchiveError::CorruptContainer`] if the reader fails; zip
/// readers report CRC mismatches this way.
pub fn drain<R: Read + ?Sized>(reader: &mut R, buffer: &mut CopyBuffer) -> Result<u64> {
    let mut total: u64 = 0;
    loop {
        match reader.read(&mut buffer.buf) {
            Ok(0) => return Ok(total),
            Ok(n) => total += n as u64,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ArchiveError::corrupt(e)),
        }
    }
}

/// Reader that yields exactly `expected` bytes from a source file.
///
/// Fails with [`io::ErrorKind::UnexpectedEof`] if the source shrinks below
/// the size recorded in the member header, and stops at `expected` if it
/// grew.
pub(crate) struct ExactReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> ExactReader<R> {
    pub(crate) fn new(inner: R, expected: u64) -> Self {
        Self {
            inner,
            remaining: expected,
        }
    }
}

impl<R: Read> Read for ExactReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let limit = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let read = self.inner.read(&mut buf[..limit])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank by {} bytes while archiving", self.remaining),
            ));
        }
        self.remaining -= read as u64;
        Ok(read)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_copy_buffer_default() {
        assert_eq!(CopyBuffer::default().size(), 64 * 1024);
    }

    #[test]
    fn test_copy_empty_payload() {
        let mut buffer = CopyBuffer::new();
        let mut output = Vec::new();
        let copied = copy_exact(&mut Cursor::new(Vec::new()), &mut output, 0, &mut buffer).unwrap();
        assert_eq!(copied, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_copy_large_payload() {
        let mut buffer = CopyBuffer::new();
        let input = vec![0x42u8; 1024 * 1024 + 7];
        let mut output = Vec::new();
        let copied = copy_exact(
            &mut Cursor::new(&input),
            &mut output,
            input.len() as u64,
            &mut buffer,
        )
        .unwrap();
        assert_eq!(copied, input.len() as u64);
        assert_eq!(output, input);
    }

    #[test]
    fn test_copy_stops_at_expected() {
        let mut buffer = CopyBuffer::new();
        let mut output = Vec::new();
        copy_exact(&mut Cursor::new(b"abcdef"), &mut output, 3, &mut buffer).unwrap();
        assert_eq!(output, b"abc");
    }

    #[test]
    fn test_expect_end() {
        expect_end(&mut Cursor::new(b"")).unwrap();
        let err = expect_end(&mut Cursor::new(b"x")).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptContainer(_)));
    }

    #[test]
    fn test_short_payload_is_corrupt() {
        let mut buffer = CopyBuffer::new();
        let mut output = Vec::new();
        let err = copy_exact(&mut Cursor::new(b"abc"), &mut output, 10, &mut buffer).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptContainer(_)));
    }

    #[test]
    fn test_write_error_is_io() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buffer = CopyBuffer::new();
        let err = copy_exact(&mut Cursor::new(b"abc"), &mut Full, 3, &mut buffer).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_drain_counts() {
        let mut buffer = CopyBuffer::new();
        assert_eq!(drain(&mut Cursor::new(vec![1u8; 1000]), &mut buffer).unwrap(), 1000);
    }

    #[test]
    fn test_exact_reader_detects_shrink() {
        let mut reader = ExactReader::new(Cursor::new(b"abc"), 5);
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_exact_reader_truncates_growth() {
        let mut reader = ExactReader::new(Cursor::new(b"abcdef"), 4);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcd");
    }
}
