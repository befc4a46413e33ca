//! Error types for the virtual filesystem crate.

use thiserror::Error;

/// Errors that can occur when working with archives and lumps.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// Fewer bytes were available than the lump's declared size.
    #[error("short read on lump {name}: expected {expected} bytes, got {actual}")]
    ShortRead {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// The archive directory is inconsistent with the file it describes.
    #[error("invalid directory in {archive}: {reason}")]
    InvalidDirectory { archive: String, reason: String },
}

/// Result type for virtual filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;
