//! Conversion outcomes and the per-session status registry

use std::fmt;
use std::path::PathBuf;

use crate::error::{ConvertError, ErrorCategory};

/// Which operation produced a set of statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Parse,
    Basic,
    Structured,
    Directory,
}

impl OperationKind {
    /// Label reported by [`StatusRegistry::last_operation_type`].
    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Parse => "parse",
            OperationKind::Basic => "basic_uvf",
            OperationKind::Structured => "structured_uvf",
            OperationKind::Directory => "directory_multi",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts describing one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub points: usize,
    pub triangles: usize,
    pub files: usize,
    pub groups: usize,
    pub operation: OperationKind,
}

impl Statistics {
    /// All-zero statistics for `operation`.
    pub fn empty(operation: OperationKind) -> Self {
        Self {
            points: 0,
            triangles: 0,
            files: 0,
            groups: 0,
            operation,
        }
    }
}

/// A file of a directory batch that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

/// Result of a directory batch that got as far as reading files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub stats: Statistics,
    /// Files that failed, in directory order
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The partial-batch error, if any file failed.
    pub fn error(&self) -> Option<ConvertError> {
        let first = self.failures.first()?;
        Some(ConvertError::PartialBatch {
            failed: self.failures.len(),
            total: self.stats.files,
            first: first.to_string(),
        })
    }
}

/// Outcome of any operation, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub success: bool,
    /// Empty on success
    pub error: String,
    pub category: Option<ErrorCategory>,
    pub stats: Statistics,
    pub failures: Vec<FileFailure>,
}

impl ConversionReport {
    pub fn succeeded(stats: Statistics) -> Self {
        Self {
            success: true,
            error: String::new(),
            category: None,
            stats,
            failures: Vec::new(),
        }
    }

    /// Report a failed operation; statistics are all zero.
    pub fn failed(operation: OperationKind, err: &ConvertError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            category: Some(err.category()),
            stats: Statistics::empty(operation),
            failures: Vec::new(),
        }
    }

    pub fn from_result(operation: OperationKind, result: Result<Statistics, ConvertError>) -> Self {
        match result {
            Ok(stats) => Self::succeeded(stats),
            Err(err) => Self::failed(operation, &err),
        }
    }

    pub fn from_batch(result: Result<BatchReport, ConvertError>) -> Self {
        match result {
            Ok(batch) => match batch.error() {
                None => Self::succeeded(batch.stats),
                Some(err) => Self {
                    success: false,
                    error: err.to_string(),
                    category: Some(err.category()),
                    stats: batch.stats,
                    failures: batch.failures,
                },
            },
            Err(err) => Self::failed(OperationKind::Directory, &err),
        }
    }
}

/// Latches the most recent report of a session.
///
/// Before any operation every getter returns the empty string or zero.
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    last: Option<ConversionReport>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the latched state with `report`.
    pub fn record(&mut self, report: &ConversionReport) {
        self.last = Some(report.clone());
    }

    pub fn last_report(&self) -> Option<&ConversionReport> {
        self.last.as_ref()
    }

    pub fn last_error(&self) -> &str {
        self.last.as_ref().map_or("", |r| r.error.as_str())
    }

    pub fn last_point_count(&self) -> usize {
        self.last.as_ref().map_or(0, |r| r.stats.points)
    }

    pub fn last_triangle_count(&self) -> usize {
        self.last.as_ref().map_or(0, |r| r.stats.triangles)
    }

    pub fn last_file_count(&self) -> usize {
        self.last.as_ref().map_or(0, |r| r.stats.files)
    }

    pub fn last_group_count(&self) -> usize {
        self.last.as_ref().map_or(0, |r| r.stats.groups)
    }

    pub fn last_operation_type(&self) -> &str {
        self.last.as_ref().map_or("", |r| r.stats.operation.label())
    }
}
