//! Reader and Writer capabilities shared by every byte-stream backend
//!
//! A backend implements one capability per type: files, compressed streams and
//! sockets are split into distinct reader and writer types, so calling the
//! wrong operation on an adapter does not compile. Callers hold the backends as
//! `Box<dyn Reader>` / `Box<dyn Writer>` and never name the concrete type.

use std::io;

use crate::error::{Error, Result};

/// Chunk size used by [`ReaderExt::read_to_end`]
const READ_CHUNK: usize = 8 * 1024;

/// Sequential byte input
pub trait Reader: Send {
    /// Read up to `buf.len()` bytes into `buf`
    ///
    /// Returns the number of bytes read. `0` means end of stream, or an empty
    /// result the backend does not consider fatal. Fewer bytes than requested
    /// is a short read, not an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Whether [`Reader::reset`] is supported. Fixed at construction.
    fn is_resettable(&self) -> bool;

    /// Rewind to the logical start of the stream
    ///
    /// # Panics
    ///
    /// Panics when the reader is not resettable. Multi-pass callers must check
    /// [`Reader::is_resettable`] first.
    fn reset(&mut self) -> Result<()> {
        not_resettable(std::any::type_name::<Self>())
    }

    /// Take the last backend error that was reported as a `0` result
    ///
    /// Compressed backends cannot tell a clean end of stream from a decode
    /// failure through the return value of `read`; they keep the error here.
    fn take_error(&mut self) -> Option<io::Error> {
        None
    }
}

/// Sequential byte output
pub trait Writer: Send {
    /// Write up to `buf.len()` bytes from `buf`
    ///
    /// Returns the number of bytes accepted. Callers must treat a count below
    /// `buf.len()` as a short write and retry with the remainder.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Push buffered bytes towards the transport
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take the last backend error that was reported as a `0` result
    fn take_error(&mut self) -> Option<io::Error> {
        None
    }
}

/// Fail loudly on a reset of a non-resettable reader
#[track_caller]
pub fn not_resettable(backend: &str) -> ! {
    panic!("reset() called on non-resettable reader `{backend}`")
}

impl<R: Reader + ?Sized> Reader for Box<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn is_resettable(&self) -> bool {
        (**self).is_resettable()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn take_error(&mut self) -> Option<io::Error> {
        (**self).take_error()
    }
}

impl<W: Writer + ?Sized> Writer for Box<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn take_error(&mut self) -> Option<io::Error> {
        (**self).take_error()
    }
}

fn is_interrupted(err: &Error) -> bool {
    matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::Interrupted)
}

/// Retry loops over [`Reader`]
pub trait ReaderExt: Reader {
    /// Read until `buf` is full or the stream returns `0`
    ///
    /// Returns the number of bytes placed in `buf`.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if is_interrupted(&e) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Read everything up to the end of the stream, appending to `out`
    fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&chunk[..n]),
                Err(e) if is_interrupted(&e) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(out.len() - start)
    }
}

impl<R: Reader + ?Sized> ReaderExt for R {}

/// Retry loops over [`Writer`]
pub trait WriterExt: Writer {
    /// Write the whole buffer, retrying short writes
    ///
    /// A `0` result with bytes still pending fails with
    /// [`io::ErrorKind::WriteZero`].
    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "writer accepted no bytes",
                    )));
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if is_interrupted(&e) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<W: Writer + ?Sized> WriterExt for W {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `step` bytes per call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        interrupt_next: bool,
    }

    impl Reader for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::from(io::ErrorKind::Interrupted).into());
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn is_resettable(&self) -> bool {
            false
        }
    }

    /// Accepts at most `step` bytes per call, then stalls after `limit`
    struct Stingy {
        out: Vec<u8>,
        step: usize,
        limit: usize,
    }

    impl Writer for Stingy {
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            let n = self.step.min(buf.len()).min(self.limit - self.out.len());
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_read_full_loops_over_short_reads() {
        let mut reader = Trickle {
            data: (0u8..100).collect(),
            pos: 0,
            step: 7,
            interrupt_next: true,
        };
        let mut buf = [0u8; 64];

        assert_eq!(reader.read_full(&mut buf).unwrap(), 64);
        assert_eq!(&buf[..], &reader.data[..64]);

        let mut rest = Vec::new();
        assert_eq!(reader.read_to_end(&mut rest).unwrap(), 36);
        assert_eq!(rest, (64u8..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_write_all_reports_write_zero() {
        let mut writer = Stingy {
            out: Vec::new(),
            step: 3,
            limit: 10,
        };

        writer.write_all(b"abcdefghij").unwrap();
        assert_eq!(writer.out, b"abcdefghij");

        let err = writer.write_all(b"k").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::WriteZero));
    }

    #[test]
    #[should_panic(expected = "non-resettable")]
    fn test_default_reset_panics() {
        let mut reader = Trickle {
            data: Vec::new(),
            pos: 0,
            step: 1,
            interrupt_next: false,
        };
        let _ = reader.reset();
    }
}
