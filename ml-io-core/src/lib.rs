//! Byte-stream capabilities for ML data pipelines
//!
//! This crate defines the [`Reader`] and [`Writer`] traits that every transport
//! backend implements, the error and configuration types they share, and the
//! in-memory backends. File, compressed, stdio and socket backends live in
//! `ml-io-adapters`.

#![warn(missing_docs)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod io;

// Re-export key types for convenience
pub use buffer::{BufferView, SharedBuffer, VectorSink};
pub use config::IoConfig;
pub use error::{Error, Result};
pub use io::{Reader, ReaderExt, Writer, WriterExt};
