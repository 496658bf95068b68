//! Gzip-compressed backends over files and the standard streams
//!
//! The readers decode standard gzip, including concatenated members, and pass
//! plain (uncompressed) input through unchanged. The writers produce a single
//! gzip member that is finished when the writer is dropped.
//!
//! Decode and encode failures are reported as a `0` result, the same value as a
//! clean end of stream. The failure itself is logged and kept for
//! [`Reader::take_error`] / [`Writer::take_error`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ml_io_core::{Error, IoConfig, Reader, Result, Writer};
use tracing::{debug, trace, warn};

use crate::sys::{self, FileMode};

/// First two bytes of every gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Bytes taken off the transport during detection, replayed ahead of the rest
type Stream<R> = io::Chain<io::Cursor<Vec<u8>>, BufReader<R>>;

enum Decode<R> {
    /// Format not known until two bytes have arrived or the input ended
    Pending(Vec<u8>, BufReader<R>),
    Gzip(MultiGzDecoder<Stream<R>>),
    Plain(Stream<R>),
}

/// Decoding half shared by the file and stdin readers
struct GzipSource<R> {
    state: Option<Decode<R>>,
    last_error: Option<io::Error>,
}

impl<R: Read> GzipSource<R> {
    fn new(inner: R, capacity: usize) -> Self {
        Self {
            state: Some(Decode::Pending(
                Vec::with_capacity(GZIP_MAGIC.len()),
                BufReader::with_capacity(capacity, inner),
            )),
            last_error: None,
        }
    }

    fn detect(&mut self) -> io::Result<()> {
        let Some(Decode::Pending(head, source)) = self.state.as_mut() else {
            return Ok(());
        };

        let gzip = loop {
            if head.first().is_some_and(|&b| b != GZIP_MAGIC[0]) {
                break false;
            }
            if head.len() == GZIP_MAGIC.len() {
                break head[..] == GZIP_MAGIC;
            }

            let available = source.fill_buf()?;
            if head.is_empty() && available.len() >= GZIP_MAGIC.len() {
                break available.starts_with(&GZIP_MAGIC);
            }
            if available.is_empty() {
                break false;
            }

            // Short fill: hold the bytes aside until the magic is complete
            let take = (GZIP_MAGIC.len() - head.len()).min(available.len());
            head.extend_from_slice(&available[..take]);
            source.consume(take);
        };

        if let Some(Decode::Pending(head, source)) = self.state.take() {
            trace!(gzip, "detected input format");
            let stream = io::Cursor::new(head).chain(source);
            self.state = Some(if gzip {
                Decode::Gzip(MultiGzDecoder::new(stream))
            } else {
                Decode::Plain(stream)
            });
        }
        Ok(())
    }

    fn decode(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let result = self.detect().and_then(|()| match self.state.as_mut() {
                Some(Decode::Gzip(decoder)) => decoder.read(buf),
                Some(Decode::Plain(stream)) => stream.read(buf),
                Some(Decode::Pending(..)) | None => Ok(0),
            });
            match result {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                other => return other,
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }

        match self.decode(buf) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "gzip read failed, reporting end of stream");
                self.last_error = Some(e);
                0
            }
        }
    }
}

impl<R: Read + Seek> GzipSource<R> {
    fn rewind(&mut self) -> io::Result<()> {
        let mut source = match self.state.take() {
            Some(Decode::Pending(_, source)) => source,
            Some(Decode::Plain(stream)) => stream.into_inner().1,
            Some(Decode::Gzip(decoder)) => decoder.into_inner().into_inner().1,
            None => return Ok(()),
        };

        let result = source.seek(SeekFrom::Start(0));
        self.state = Some(Decode::Pending(Vec::with_capacity(GZIP_MAGIC.len()), source));
        self.last_error = None;
        result.map(drop)
    }
}

/// Encoding half shared by the file and stdout writers
struct GzipSink<W: Write> {
    encoder: Option<GzEncoder<BufWriter<W>>>,
    last_error: Option<io::Error>,
}

impl<W: Write> GzipSink<W> {
    fn new(inner: W, config: &IoConfig) -> Self {
        let inner = BufWriter::with_capacity(config.buffer_size, inner);
        Self {
            encoder: Some(GzEncoder::new(inner, Compression::new(config.compression_level))),
            last_error: None,
        }
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let Some(encoder) = self.encoder.as_mut() else {
            return 0;
        };

        match encoder.write(buf) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "gzip write failed, reporting zero bytes written");
                self.last_error = Some(e);
                0
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.encoder.as_mut() {
            Some(encoder) => encoder.flush(),
            None => Ok(()),
        }
    }

    /// Write the gzip trailer and flush everything to the transport
    fn finish(&mut self) -> io::Result<()> {
        match self.encoder.take() {
            Some(encoder) => encoder.finish()?.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for GzipSink<W> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!(error = %e, "failed to finish gzip stream");
        }
    }
}

fn open_required(path: &Path, mode: FileMode, config: &IoConfig) -> Result<File> {
    sys::open_options(mode, config.file_permissions)
        .open(path)
        .map_err(|e| Error::open(path.display().to_string(), e))
}

/// Resettable reader over a gzip file
pub struct GzipFileReader {
    /// Path the file was opened from, if any
    path: Option<PathBuf>,

    /// Decoder state over the file
    source: GzipSource<File>,
}

impl GzipFileReader {
    /// Open `path` for decompression
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, &IoConfig::default())
    }

    /// Open `path` with the buffer size in `config`
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let file = open_required(path, FileMode::Read, config)?;
        debug!(path = %path.display(), "opened gzip file for reading");

        Ok(Self {
            path: Some(path.to_path_buf()),
            source: GzipSource::new(file, config.buffer_size),
        })
    }

    /// Decompress from a file the caller already opened for reading
    pub fn from_file(file: File, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            path: None,
            source: GzipSource::new(file, config.buffer_size),
        })
    }

    /// Path the reader was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Reader for GzipFileReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.source.read(buf))
    }

    fn is_resettable(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<()> {
        Ok(self.source.rewind()?)
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.source.last_error.take()
    }
}

/// Writer producing a gzip file
pub struct GzipFileWriter {
    /// Path the file was opened from, if any
    path: Option<PathBuf>,

    /// Encoder state over the file
    sink: GzipSink<File>,
}

impl GzipFileWriter {
    /// Create or truncate `path` for compressed output
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_config(path, &IoConfig::default())
    }

    /// Create or truncate `path` with the level and buffer size in `config`
    pub fn create_with_config<P: AsRef<Path>>(path: P, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let file = open_required(path, FileMode::Write, config)?;
        debug!(
            path = %path.display(),
            level = config.compression_level,
            "opened gzip file for writing"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            sink: GzipSink::new(file, config),
        })
    }

    /// Compress into a file the caller already opened for writing
    pub fn from_file(file: File, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            path: None,
            sink: GzipSink::new(file, config),
        })
    }

    /// Path the writer was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Finish the stream now, surfacing any error instead of logging it on drop
    pub fn finish(mut self) -> Result<()> {
        Ok(self.sink.finish()?)
    }
}

impl Writer for GzipFileWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.sink.write(buf))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.sink.flush()?)
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.sink.last_error.take()
    }
}

/// Reader decompressing the process's standard input
///
/// Standard input cannot be rewound, so this reader is not resettable.
pub struct GzipStdinReader {
    source: GzipSource<File>,
}

impl GzipStdinReader {
    /// Decompress from a duplicate of the standard input descriptor
    pub fn new() -> Result<Self> {
        let stdin = sys::duplicate_stdin().map_err(|e| Error::open("<stdin>", e))?;
        debug!("opened gzip reader on stdin");
        Self::from_stream(stdin, &IoConfig::default())
    }

    pub(crate) fn from_stream(stream: File, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: GzipSource::new(stream, config.buffer_size),
        })
    }
}

impl Reader for GzipStdinReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.source.read(buf))
    }

    fn is_resettable(&self) -> bool {
        false
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.source.last_error.take()
    }
}

/// Writer compressing onto the process's standard output
pub struct GzipStdoutWriter {
    sink: GzipSink<File>,
}

impl GzipStdoutWriter {
    /// Compress onto a duplicate of the standard output descriptor
    pub fn new() -> Result<Self> {
        Self::with_config(&IoConfig::default())
    }

    /// Compress onto standard output with the level in `config`
    pub fn with_config(config: &IoConfig) -> Result<Self> {
        let stdout = sys::duplicate_stdout().map_err(|e| Error::open("<stdout>", e))?;
        debug!(level = config.compression_level, "opened gzip writer on stdout");
        Self::from_stream(stdout, config)
    }

    pub(crate) fn from_stream(stream: File, config: &IoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sink: GzipSink::new(stream, config),
        })
    }
}

impl Writer for GzipStdoutWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.sink.write(buf))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.sink.flush()?)
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.sink.last_error.take()
    }
}
