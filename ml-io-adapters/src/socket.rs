//! Socket backend with shared descriptor ownership
//!
//! A [`Socket`] wraps a descriptor that an outer networking layer already
//! connected or accepted. It hands out independent reader and writer views,
//! each holding the same [`SocketCloser`]; the descriptor is closed once, when
//! the last of them is dropped. Transfers go straight to the OS with no
//! buffering and no framing.

use std::sync::Arc;

use ml_io_core::{Reader, Result, Writer};
use static_assertions::assert_impl_all;
use tracing::{debug, trace};

use crate::sys::{RawDescriptor, SocketDescriptor};

/// Closes the wrapped descriptor when dropped
#[derive(Debug)]
pub struct SocketCloser {
    descriptor: SocketDescriptor,
}

impl SocketCloser {
    /// The raw descriptor being guarded
    pub fn descriptor(&self) -> RawDescriptor {
        self.descriptor.raw()
    }
}

impl Drop for SocketCloser {
    fn drop(&mut self) {
        // The descriptor field closes right after this
        debug!(descriptor = ?self.descriptor.raw(), "closing socket");
    }
}

/// Factory handle for the views of one socket
#[derive(Debug, Clone)]
pub struct Socket {
    closer: Arc<SocketCloser>,
}

impl Socket {
    /// Take ownership of a connected socket descriptor
    ///
    /// # Safety
    ///
    /// `descriptor` must be an open socket that nothing else owns or closes.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw(descriptor: RawDescriptor) -> Self {
        Self::from_descriptor(SocketDescriptor::from_raw(descriptor))
    }

    fn from_descriptor(descriptor: SocketDescriptor) -> Self {
        debug!(descriptor = ?descriptor.raw(), "wrapped socket");
        Self {
            closer: Arc::new(SocketCloser { descriptor }),
        }
    }

    /// A reader view over the socket
    pub fn reader(&self) -> Box<dyn Reader> {
        Box::new(SocketReader {
            closer: Arc::clone(&self.closer),
        })
    }

    /// A writer view over the socket
    pub fn writer(&self) -> Box<dyn Writer> {
        Box::new(SocketWriter {
            closer: Arc::clone(&self.closer),
        })
    }

    /// The raw descriptor
    pub fn descriptor(&self) -> RawDescriptor {
        self.closer.descriptor()
    }

    /// Number of live owners of the descriptor, this handle included
    pub fn owner_count(&self) -> usize {
        Arc::strong_count(&self.closer)
    }
}

#[cfg(unix)]
impl From<std::os::fd::OwnedFd> for Socket {
    fn from(fd: std::os::fd::OwnedFd) -> Self {
        Self::from_descriptor(SocketDescriptor::from(fd))
    }
}

#[cfg(windows)]
impl From<std::os::windows::io::OwnedSocket> for Socket {
    fn from(socket: std::os::windows::io::OwnedSocket) -> Self {
        Self::from_descriptor(SocketDescriptor::from(socket))
    }
}

/// Reading view of a [`Socket`]
#[derive(Debug)]
pub struct SocketReader {
    closer: Arc<SocketCloser>,
}

impl Reader for SocketReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.closer.descriptor.recv(buf)?;
        trace!(requested = buf.len(), read = n, "socket read");
        Ok(n)
    }

    fn is_resettable(&self) -> bool {
        false
    }
}

/// Writing view of a [`Socket`]
#[derive(Debug)]
pub struct SocketWriter {
    closer: Arc<SocketCloser>,
}

impl Writer for SocketWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.closer.descriptor.send(buf)?;
        trace!(requested = buf.len(), written = n, "socket write");
        Ok(n)
    }
}

assert_impl_all!(Socket: Send, Sync);
assert_impl_all!(SocketReader: Send);
assert_impl_all!(SocketWriter: Send);
