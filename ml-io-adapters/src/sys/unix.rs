#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use super::FileMode;

/// Raw OS handle accepted by the socket constructors
pub type RawDescriptor = RawFd;

#[cfg(target_os = "linux")]
const LARGE_FILE: libc::c_int = libc::O_LARGEFILE;

#[cfg(not(target_os = "linux"))]
const LARGE_FILE: libc::c_int = 0;

pub(crate) fn open_options(mode: FileMode, permissions: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    match mode {
        FileMode::Read => {
            options.read(true);
        }
        FileMode::Write => {
            options.write(true).create(true).truncate(true).mode(permissions);
        }
    }
    options.custom_flags(LARGE_FILE);
    options
}

pub(crate) fn duplicate_stdin() -> io::Result<File> {
    Ok(File::from(io::stdin().as_fd().try_clone_to_owned()?))
}

pub(crate) fn duplicate_stdout() -> io::Result<File> {
    Ok(File::from(io::stdout().as_fd().try_clone_to_owned()?))
}

/// Owned socket descriptor, closed on drop
#[derive(Debug)]
pub(crate) struct SocketDescriptor {
    fd: OwnedFd,
}

impl SocketDescriptor {
    /// Take ownership of `fd`
    ///
    /// # Safety
    ///
    /// `fd` must be open and not owned by anything else.
    pub(crate) unsafe fn from_raw(fd: RawFd) -> Self {
        Self {
            fd: OwnedFd::from_raw_fd(fd),
        }
    }

    pub(crate) fn raw(&self) -> RawDescriptor {
        self.fd.as_raw_fd()
    }

    pub(crate) fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: the descriptor is owned by `self` and `buf` is valid for `buf.len()` bytes
        let n = unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: the descriptor is owned by `self` and `buf` is valid for `buf.len()` bytes
        let n = unsafe { libc::write(self.fd.as_raw_fd(), buf.as_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

impl From<OwnedFd> for SocketDescriptor {
    fn from(fd: OwnedFd) -> Self {
        Self { fd }
    }
}
