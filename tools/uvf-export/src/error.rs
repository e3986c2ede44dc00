//! Conversion error types

use std::io;
use std::path::PathBuf;

/// What is wrong with an input file's contents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatIssue {
    #[error("malformed data: {0}")]
    Malformed(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("unexpected end of data while reading {0}")]
    Truncated(String),

    #[error("cell references point {index} but the mesh has {count} points")]
    IndexOutOfRange { index: u64, count: usize },

    #[error("mesh has no points")]
    NoPoints,
}

/// Error returned by every conversion operation.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {issue}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        issue: FormatIssue,
    },

    #[error("Output already exists: {} (pass force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("No .vtk or .vtp files found in directory: {}", .0.display())]
    NoMatchingFiles(PathBuf),

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("{failed} of {total} files failed to convert; first failure: {first}")]
    PartialBatch {
        failed: usize,
        total: usize,
        first: String,
    },

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Coarse error taxonomy reported alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing/unreadable input, unwritable output
    Io,
    /// Malformed or out-of-range mesh data
    Format,
    /// Invalid mode, existing output, empty or missing directory
    Usage,
    /// Some files of a directory batch failed
    PartialBatch,
}

impl ConvertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::Read { .. } | ConvertError::Write { .. } | ConvertError::Manifest(_) => {
                ErrorCategory::Io
            }
            ConvertError::Format { .. } => ErrorCategory::Format,
            ConvertError::OutputExists(_)
            | ConvertError::NotADirectory(_)
            | ConvertError::NoMatchingFiles(_)
            | ConvertError::InvalidMode(_) => ErrorCategory::Usage,
            ConvertError::PartialBatch { .. } => ErrorCategory::PartialBatch,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, issue: FormatIssue) -> Self {
        ConvertError::Format {
            path: path.into(),
            issue,
        }
    }
}
