//! Transport backends for ML data pipeline byte streams
//!
//! This crate implements the [`Reader`] and [`Writer`] capabilities from
//! `ml-io-core` over plain files, gzip files, memory-mapped files, the standard
//! streams (plain and gzip) and connected sockets. Most callers only need the
//! [`factory`] functions, which return the backends as trait objects.

#![warn(missing_docs)]

mod sys;

pub mod factory;
pub mod file;
pub mod gzip;
pub mod mmap;
pub mod socket;
pub mod stdio;

pub use factory::{
    create_buffer_view, create_vector_writer, open_compressed_file_reader,
    open_compressed_file_writer, open_compressed_file_writer_with_config, open_compressed_stdin,
    open_compressed_stdout, open_file_reader, open_file_writer, open_file_writer_with_config,
    open_mapped_file_reader, open_stdin, open_stdout, wrap_socket_descriptor,
};
pub use file::{FileReader, FileWriter};
pub use gzip::{GzipFileReader, GzipFileWriter, GzipStdinReader, GzipStdoutWriter};
pub use mmap::MappedFileReader;
pub use socket::{Socket, SocketCloser, SocketReader, SocketWriter};
pub use stdio::{StdinReader, StdoutWriter};
pub use sys::RawDescriptor;

// Re-export core types
pub use ml_io_core::{
    BufferView, Error, IoConfig, Reader, ReaderExt, Result, SharedBuffer, VectorSink, Writer,
    WriterExt,
};
