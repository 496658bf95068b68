//! Error types for byte-stream adapters

use std::io;
use thiserror::Error;

/// Result type for byte-stream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for byte-stream operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error during a transfer or seek
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A file, descriptor or standard stream could not be acquired
    #[error("can't open {resource}: {source}")]
    Open {
        /// Path or stream name that failed to open
        resource: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// The adapter was created from an empty path and has no file behind it
    #[error("No file bound to this adapter")]
    NoFile,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Build an [`Error::Open`] for the given resource
    pub fn open(resource: impl Into<String>, source: io::Error) -> Self {
        Self::Open {
            resource: resource.into(),
            source,
        }
    }

    /// Whether this error means the named resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Open { source, .. } | Self::Io(source) => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// The OS error code behind this error, if there is one
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Open { source, .. } | Self::Io(source) => source.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_names_resource() {
        let err = Error::open("/data/train.txt", io::Error::from(io::ErrorKind::NotFound));

        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("can't open /data/train.txt"));
    }

    #[test]
    fn test_raw_os_error_passthrough() {
        let err = Error::open("x", io::Error::from_raw_os_error(13));
        assert_eq!(err.raw_os_error(), Some(13));

        assert_eq!(Error::NoFile.raw_os_error(), None);
        assert!(!Error::InvalidArgument("level".into()).is_not_found());
    }
}
