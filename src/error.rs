//! Error types for disklist

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for disklist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for device enumeration
#[derive(Error, Debug)]
pub enum Error {
    /// The platform device registry could not be opened at all.
    ///
    /// Distinct from an empty inventory: a host with zero disks yields
    /// `Ok` with an empty list, never this variant.
    #[error("device registry unavailable: {0}")]
    SourceUnavailable(String),

    /// A probed path does not exist
    #[error("no such device or file: {0}")]
    NotFound(PathBuf),

    /// Enumeration is not implemented for this platform
    #[error("not supported: {0}")]
    Unsupported(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),
}
