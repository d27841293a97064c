//! Driver errors.

use std::io;

use thiserror::Error;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that abort a benchmark run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Writing the view output failed.
    #[error("output error: {0}")]
    Io(#[from] io::Error),

    /// A storage operation that must succeed failed.
    #[error("storage error: {0}")]
    Storage(#[from] stowage_foundation::Error),

    /// The configuration is inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
