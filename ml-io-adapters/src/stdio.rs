//! Standard input and output backends

use std::io::{self, Read, Write};

use ml_io_core::{Reader, Result, Writer};
use tracing::warn;

/// Reader over the process's standard input
///
/// Returns whatever the stream delivered per call, which may be fewer bytes
/// than requested. Not resettable.
#[derive(Debug, Default)]
pub struct StdinReader;

impl StdinReader {
    /// Create a reader over standard input
    pub fn new() -> Self {
        Self
    }
}

impl Reader for StdinReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(io::stdin().read(buf)?)
    }

    fn is_resettable(&self) -> bool {
        false
    }
}

/// Writer onto the process's standard output
///
/// Standard output is buffered, so a short write cannot be observed here: each
/// call pushes the whole buffer and reports its full length.
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl StdoutWriter {
    /// Create a writer onto standard output
    pub fn new() -> Self {
        Self
    }
}

impl Writer for StdoutWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(io::stdout().flush()?)
    }
}

impl Drop for StdoutWriter {
    fn drop(&mut self) {
        if let Err(e) = io::stdout().flush() {
            warn!(error = %e, "failed to flush stdout");
        }
    }
}
