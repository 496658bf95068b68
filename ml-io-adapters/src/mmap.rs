//! Memory-mapped file reader

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};
use ml_io_core::{BufferView, Error, Reader, Result};
use tracing::debug;

/// Resettable reader over a read-only mapping of a file
pub struct MappedFileReader {
    /// The path to the file
    path: PathBuf,

    /// The memory map, `None` for an empty file
    mmap: Option<Mmap>,

    /// Offset of the next byte to read
    cursor: usize,
}

impl MappedFileReader {
    /// Map `path` for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_error = |e| Error::open(path.display().to_string(), e);

        let file = File::open(&path).map_err(open_error)?;
        let size = file.metadata().map_err(open_error)?.len();

        // Zero-length mappings are rejected by some platforms
        let mmap = if size == 0 {
            None
        } else {
            #[allow(unsafe_code)]
            let mmap = unsafe { MmapOptions::new().map(&file).map_err(open_error)? };
            Some(mmap)
        };
        debug!(path = %path.display(), size, "mapped file");

        Ok(Self {
            path,
            mmap,
            cursor: 0,
        })
    }

    /// Get the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the mapped bytes
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or_default()
    }
}

impl Reader for MappedFileReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let cursor = self.cursor;
        let mut view = BufferView::new(&self.as_slice()[cursor..]);
        let n = view.read_into(buf);
        self.cursor += n;
        Ok(n)
    }

    fn is_resettable(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}
