//! Print sink errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrintError {
    /// TCP printer refused or dropped the connection
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Device file could not be opened for writing
    #[error("Device unavailable: {}: {source}", path.display())]
    Device {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write or flush failed after the sink was opened
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TCP connect did not finish in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// `print()` called with no staged buffer
    #[error("No print buffer set")]
    EmptyBuffer,

    /// Unusable printer target
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type PrintResult<T> = Result<T, PrintError>;
