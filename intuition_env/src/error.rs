//! Error types for the environment abstraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sink rejected or lost the table
    #[error("Sink error: {0}")]
    SinkError(String),
}

impl EnvError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a sink error.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::SinkError(msg.into())
    }
}
