//! Error types for the walker module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;

/// Errors that abort a tree conversion.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Failed to list an input directory.
    #[error("Failed to list directory: {path}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to check whether a target path exists.
    #[error("Failed to check existence of: {path}")]
    Exists {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a mirrored directory.
    #[error("Failed to create directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter reported an error for a file.
    #[error("Failed to convert: {path}")]
    Conversion {
        path: PathBuf,
        #[source]
        source: ConverterError,
    },
}

impl WalkError {
    /// The path the failing operation was working on.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::ListDir { path, .. }
            | Self::Exists { path, .. }
            | Self::CreateDir { path, .. }
            | Self::Conversion { path, .. } => path,
        }
    }

    /// Whether the failure came from the converter rather than the filesystem.
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }
}
