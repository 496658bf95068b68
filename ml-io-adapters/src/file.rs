//! Plain file backends
//!
//! A file is opened in exactly one direction: [`FileReader`] is read-only and
//! resettable, [`FileWriter`] creates or truncates its target. An empty path is
//! accepted and produces an adapter with no file behind it.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ml_io_core::{Error, IoConfig, Reader, Result, Writer};
use tracing::{debug, trace};

use crate::sys::{self, FileMode};

/// Open `path` in `mode`, or `None` for the empty path
fn open_path(path: &Path, mode: FileMode, config: &IoConfig) -> Result<Option<File>> {
    if path.as_os_str().is_empty() {
        debug!(?mode, "empty path, adapter has no file");
        return Ok(None);
    }

    let file = sys::open_options(mode, config.file_permissions)
        .open(path)
        .map_err(|e| Error::open(path.display().to_string(), e))?;

    debug!(path = %path.display(), ?mode, "opened file");
    Ok(Some(file))
}

/// Resettable reader over a file
#[derive(Debug)]
pub struct FileReader {
    /// Path the file was opened from, if any
    path: Option<PathBuf>,

    /// The open file, `None` for the empty path
    file: Option<File>,
}

impl FileReader {
    /// Open `path` for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_path(path, FileMode::Read, &IoConfig::default())?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            file,
        })
    }

    /// Read from a file the caller already opened for reading
    pub fn from_file(file: File) -> Self {
        Self {
            path: None,
            file: Some(file),
        }
    }

    /// Take ownership of a raw descriptor opened for reading
    ///
    /// # Safety
    ///
    /// `fd` must be an open file descriptor that nothing else owns.
    #[cfg(unix)]
    #[allow(unsafe_code)]
    pub unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
        use std::os::fd::FromRawFd;
        Self::from_file(File::from_raw_fd(fd))
    }

    /// Path the reader was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Reader for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(file) = self.file.as_mut() else {
            return Ok(0);
        };

        let n = file.read(buf)?;
        trace!(requested = buf.len(), read = n, "file read");
        Ok(n)
    }

    fn is_resettable(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.seek(SeekFrom::Start(0))?;
        }
        Ok(())
    }
}

/// Writer over a created or truncated file
#[derive(Debug)]
pub struct FileWriter {
    /// Path the file was opened from, if any
    path: Option<PathBuf>,

    /// The open file, `None` for the empty path
    file: Option<File>,
}

impl FileWriter {
    /// Create or truncate `path` for writing
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_config(path, &IoConfig::default())
    }

    /// Create or truncate `path` using the permissions in `config`
    pub fn create_with_config<P: AsRef<Path>>(path: P, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let file = open_path(path, FileMode::Write, config)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            file,
        })
    }

    /// Write to a file the caller already opened for writing
    pub fn from_file(file: File) -> Self {
        Self {
            path: None,
            file: Some(file),
        }
    }

    /// Take ownership of a raw descriptor opened for writing
    ///
    /// # Safety
    ///
    /// `fd` must be an open file descriptor that nothing else owns.
    #[cfg(unix)]
    #[allow(unsafe_code)]
    pub unsafe fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
        use std::os::fd::FromRawFd;
        Self::from_file(File::from_raw_fd(fd))
    }

    /// Path the writer was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Writer for FileWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let file = self.file.as_mut().ok_or(Error::NoFile)?;

        let n = file.write(buf)?;
        trace!(requested = buf.len(), written = n, "file write");
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_io_core::{ReaderExt, WriterExt};
    use proptest::prelude::*;
    use test_case::test_case;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    fn write_in_chunks(path: &Path, data: &[u8], chunk: usize) {
        let mut writer = FileWriter::create(path).unwrap();
        for part in data.chunks(chunk) {
            writer.write_all(part).unwrap();
        }
        writer.flush().unwrap();
    }

    fn read_in_chunks(reader: &mut FileReader, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test_case(0, 1, 1 ; "empty")]
    #[test_case(1, 1, 1 ; "single byte")]
    #[test_case(10_000, 7, 4096 ; "small writes large reads")]
    #[test_case(10_000, 4096, 3 ; "large writes small reads")]
    fn test_round_trip(len: usize, write_chunk: usize, read_chunk: usize) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data = payload(len);

        write_in_chunks(&path, &data, write_chunk);
        let mut reader = FileReader::open(&path).unwrap();

        assert_eq!(read_in_chunks(&mut reader, read_chunk), data);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip_any_chunking(
            data in proptest::collection::vec(any::<u8>(), 0..16_384),
            write_chunk in 1usize..2048,
            read_chunk in 1usize..2048,
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("chunked.bin");

            write_in_chunks(&path, &data, write_chunk);
            let mut reader = FileReader::open(&path).unwrap();

            prop_assert_eq!(read_in_chunks(&mut reader, read_chunk), data);
        }
    }

    #[test]
    fn test_reset_replays_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epochs.txt");
        std::fs::write(&path, b"1 |f a b\n0 |f c\n").unwrap();

        let mut reader = FileReader::open(&path).unwrap();
        assert!(reader.is_resettable());

        let mut first = Vec::new();
        reader.read_to_end(&mut first).unwrap();
        reader.reset().unwrap();
        let mut second = Vec::new();
        reader.read_to_end(&mut second).unwrap();

        assert_eq!(first, b"1 |f a b\n0 |f c\n");
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = FileReader::open(&path).unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_empty_path_has_no_file() {
        let mut reader = FileReader::open("").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        reader.reset().unwrap();

        let mut writer = FileWriter::create("").unwrap();
        assert!(matches!(writer.write(b"x"), Err(Error::NoFile)));
    }

    #[test]
    fn test_writer_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"old contents that are longer").unwrap();

        let mut writer = FileWriter::create(&path).unwrap();
        writer.write_all(b"new").unwrap();
        writer.flush().unwrap();
        drop(writer);

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_from_open_file() {
        let mut tmp = tempfile::tempfile().unwrap();
        tmp.write_all(b"abc").unwrap();
        tmp.seek(SeekFrom::Start(0)).unwrap();

        let mut reader = FileReader::from_file(tmp);
        assert!(reader.path().is_none());

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");
    }

    #[cfg(unix)]
    #[test]
    fn test_created_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private.bin");
        let config = IoConfig::default().with_file_permissions(0o600);

        FileWriter::create_with_config(&path, &config).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }
}
