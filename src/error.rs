//! Error definitions for a generation run.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort a generation run.
///
/// Malformed declarations, incomplete routes and unknown PHP versions are
/// never represented here: they degrade instead of failing.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Reading, writing or removing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The projects tree could not be walked.
    #[error("Failed to walk projects tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// The environment file exists but could not be read.
    #[error("Failed to read environment file: {0}")]
    Env(#[from] dotenvy::Error),

    /// The configuration file is missing, unparseable or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
