//! Application-wide error types using thiserror.

use atlas_common::AtlasError;
use std::path::PathBuf;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Configuration, source or pipeline failure.
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    /// An output file could not be written.
    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Wraps an I/O failure on `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type for the command line application.
pub type CliResult<T> = Result<T, CliError>;
