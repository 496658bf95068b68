//! Platform seam for descriptor plumbing
//!
//! Everything that differs between operating systems lives behind this module:
//! open flags, raw socket transfers, descriptor ownership and duplication of the
//! standard streams. The adapters above it are platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::RawDescriptor;
#[cfg(unix)]
pub(crate) use unix::{duplicate_stdin, duplicate_stdout, open_options, SocketDescriptor};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::RawDescriptor;
#[cfg(windows)]
pub(crate) use windows::{duplicate_stdin, duplicate_stdout, open_options, SocketDescriptor};

/// Direction a file is opened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileMode {
    /// Read-only, must exist
    Read,
    /// Write-only, created or truncated
    Write,
}
