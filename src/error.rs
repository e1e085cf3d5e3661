/*!
 * Error types for irods-demo
 */

use irods_core_interface::GridError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_USAGE: i32 = 1;

#[derive(Error, Debug)]
pub enum DemoError {
    /// Malformed command line
    #[error("{0}")]
    Usage(String),

    /// Port option that is not a number in `0..=65535`
    #[error("Invalid port number: {0:?}")]
    InvalidPort(String),

    /// Configuration file could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Password could not be read from the terminal
    #[error("could not read password: {0}")]
    Password(String),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    /// Get the process exit code for this error
    ///
    /// Only usage errors force a non-zero exit; every other failure is
    /// reported and the process ends normally.
    pub fn exit_code(&self) -> i32 {
        match self {
            DemoError::Usage(_) => EXIT_USAGE,
            _ => EXIT_SUCCESS,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, DemoError::Usage(_))
    }
}
