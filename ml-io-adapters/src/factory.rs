//! Entry points that open a backend and hand it out behind a capability trait
//!
//! Callers depend only on [`Reader`] and [`Writer`]; swapping a file for an
//! in-memory view does not change their code.

use std::path::Path;

use ml_io_core::{BufferView, IoConfig, Reader, Result, SharedBuffer, VectorSink, Writer};
use static_assertions::assert_obj_safe;

use crate::file::{FileReader, FileWriter};
use crate::gzip::{GzipFileReader, GzipFileWriter, GzipStdinReader, GzipStdoutWriter};
use crate::mmap::MappedFileReader;
use crate::socket::Socket;
use crate::stdio::{StdinReader, StdoutWriter};
use crate::sys::RawDescriptor;

assert_obj_safe!(Reader, Writer);

/// Open a plain file for reading
pub fn open_file_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn Reader>> {
    Ok(Box::new(FileReader::open(path)?))
}

/// Create or truncate a plain file for writing
pub fn open_file_writer<P: AsRef<Path>>(path: P) -> Result<Box<dyn Writer>> {
    open_file_writer_with_config(path, &IoConfig::default())
}

/// Create or truncate a plain file using the permissions in `config`
pub fn open_file_writer_with_config<P: AsRef<Path>>(
    path: P,
    config: &IoConfig,
) -> Result<Box<dyn Writer>> {
    Ok(Box::new(FileWriter::create_with_config(path, config)?))
}

/// Open a gzip file for reading
pub fn open_compressed_file_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn Reader>> {
    Ok(Box::new(GzipFileReader::open(path)?))
}

/// Create or truncate a gzip file for writing
pub fn open_compressed_file_writer<P: AsRef<Path>>(path: P) -> Result<Box<dyn Writer>> {
    open_compressed_file_writer_with_config(path, &IoConfig::default())
}

/// Create or truncate a gzip file with the level and buffer size in `config`
pub fn open_compressed_file_writer_with_config<P: AsRef<Path>>(
    path: P,
    config: &IoConfig,
) -> Result<Box<dyn Writer>> {
    Ok(Box::new(GzipFileWriter::create_with_config(path, config)?))
}

/// Decompress standard input
pub fn open_compressed_stdin() -> Result<Box<dyn Reader>> {
    Ok(Box::new(GzipStdinReader::new()?))
}

/// Compress onto standard output
pub fn open_compressed_stdout() -> Result<Box<dyn Writer>> {
    Ok(Box::new(GzipStdoutWriter::new()?))
}

/// Read standard input
pub fn open_stdin() -> Box<dyn Reader> {
    Box::new(StdinReader::new())
}

/// Write standard output
pub fn open_stdout() -> Box<dyn Writer> {
    Box::new(StdoutWriter::new())
}

/// Wrap a connected socket descriptor
///
/// # Safety
///
/// `descriptor` must be an open socket that nothing else owns or closes.
#[allow(unsafe_code)]
pub unsafe fn wrap_socket_descriptor(descriptor: RawDescriptor) -> Socket {
    Socket::from_raw(descriptor)
}

/// Append everything written to `buffer`
pub fn create_vector_writer(buffer: &SharedBuffer) -> Box<dyn Writer> {
    Box::new(VectorSink::new(buffer.clone()))
}

/// Read from borrowed memory
pub fn create_buffer_view(data: &[u8]) -> Box<dyn Reader + '_> {
    Box::new(BufferView::new(data))
}

/// Read a file through a memory map
pub fn open_mapped_file_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn Reader>> {
    Ok(Box::new(MappedFileReader::open(path)?))
}
