//! Error types for the portal-hash engine and its front end.

use std::path::PathBuf;
use thiserror::Error;

/// Hashing errors
///
/// Every engine operation either succeeds or fails with one of these; no
/// partial manifest is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Cannot access file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot access directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve current working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),
}

impl HashError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HashError::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HashError::DirectoryAccess {
            path: path.into(),
            source,
        }
    }

    /// Path the failure refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            HashError::FileAccess { path, .. } | HashError::DirectoryAccess { path, .. } => {
                Some(path)
            }
            HashError::WorkingDirectory(_) => None,
        }
    }
}

/// Front-end errors (CLI, config, manifest files)
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Hashing failed: {0}")]
    Hash(#[from] HashError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ManifestError(err.to_string())
    }
}
