//! Configuration shared by the byte-stream backends

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest gzip compression level
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Options applied when a backend opens its transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Buffer size for compressed streams
    pub buffer_size: usize,

    /// Gzip compression level (0-9)
    pub compression_level: u32,

    /// Permission bits for files created by writers (unix only)
    pub file_permissions: u32,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64KB
            compression_level: 6,
            file_permissions: 0o666,
        }
    }
}

impl IoConfig {
    /// Set the buffer size
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the compression level
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Set the permission bits for created files
    #[must_use]
    pub fn with_file_permissions(mut self, mode: u32) -> Self {
        self.file_permissions = mode;
        self
    }

    /// Check that every value is in range
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::InvalidArgument("buffer_size must be non-zero".into()));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(Error::InvalidArgument(format!(
                "compression_level {} is above {MAX_COMPRESSION_LEVEL}",
                self.compression_level
            )));
        }
        if self.file_permissions > 0o7777 {
            return Err(Error::InvalidArgument(format!(
                "file_permissions {:o} is not a permission mask",
                self.file_permissions
            )));
        }
        Ok(())
    }
}
