#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::{AsHandle, AsRawSocket, FromRawSocket, OwnedSocket, RawSocket};

use super::FileMode;

/// Raw OS handle accepted by the socket constructors
pub type RawDescriptor = RawSocket;

const FILE_SHARE_READ: u32 = 0x0000_0001;
const FILE_FLAG_SEQUENTIAL_SCAN: u32 = 0x0800_0000;

pub(crate) fn open_options(mode: FileMode, _permissions: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    match mode {
        FileMode::Read => {
            options
                .read(true)
                .share_mode(FILE_SHARE_READ)
                .custom_flags(FILE_FLAG_SEQUENTIAL_SCAN);
        }
        FileMode::Write => {
            options
                .write(true)
                .create(true)
                .truncate(true)
                .share_mode(FILE_SHARE_READ);
        }
    }
    options
}

pub(crate) fn duplicate_stdin() -> io::Result<File> {
    Ok(File::from(io::stdin().as_handle().try_clone_to_owned()?))
}

pub(crate) fn duplicate_stdout() -> io::Result<File> {
    Ok(File::from(io::stdout().as_handle().try_clone_to_owned()?))
}

/// Owned winsock handle, closed on drop
#[derive(Debug)]
pub(crate) struct SocketDescriptor {
    stream: TcpStream,
}

impl SocketDescriptor {
    /// Take ownership of `socket`
    ///
    /// # Safety
    ///
    /// `socket` must be open and not owned by anything else.
    pub(crate) unsafe fn from_raw(socket: RawSocket) -> Self {
        Self {
            stream: TcpStream::from(OwnedSocket::from_raw_socket(socket)),
        }
    }

    pub(crate) fn raw(&self) -> RawDescriptor {
        self.stream.as_raw_socket()
    }

    pub(crate) fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.stream).read(buf)
    }

    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<usize> {
        (&self.stream).write(buf)
    }
}

impl From<OwnedSocket> for SocketDescriptor {
    fn from(socket: OwnedSocket) -> Self {
        Self {
            stream: TcpStream::from(socket),
        }
    }
}
