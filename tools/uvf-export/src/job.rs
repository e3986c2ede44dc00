//! Conversion jobs and the session that runs them

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConvertError;
use crate::reader::ReadOptions;
use crate::status::{ConversionReport, OperationKind, StatusRegistry};
use crate::writer::WriteOptions;

/// How an input is turned into UVF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    /// One flat buffer and a three-node manifest
    Basic,
    /// Groups and members derived from field or solid names
    Structured,
    /// Every `.vtk`/`.vtp` file of a directory
    Directory,
}

impl ConversionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversionMode::Basic => "basic",
            ConversionMode::Structured => "structured",
            ConversionMode::Directory => "directory",
        }
    }

    /// Directory inputs convert as a batch, files as structured output.
    pub fn auto(input: &Path) -> Self {
        if input.is_dir() {
            ConversionMode::Directory
        } else {
            ConversionMode::Structured
        }
    }

    /// Parse a mode name, where `auto` picks a mode from `input`.
    pub fn resolve(name: &str, input: &Path) -> Result<Self, ConvertError> {
        if name.eq_ignore_ascii_case("auto") {
            Ok(Self::auto(input))
        } else {
            name.parse()
        }
    }

    pub fn operation(self) -> OperationKind {
        match self {
            ConversionMode::Basic => OperationKind::Basic,
            ConversionMode::Structured => OperationKind::Structured,
            ConversionMode::Directory => OperationKind::Directory,
        }
    }
}

impl FromStr for ConversionMode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(ConversionMode::Basic),
            "structured" => Ok(ConversionMode::Structured),
            "directory" => Ok(ConversionMode::Directory),
            _ => Err(ConvertError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ConversionMode,
    pub force: bool,
    /// Merge identical STL vertices within each solid
    pub dedup: bool,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, mode: ConversionMode) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            mode,
            force: false,
            dedup: true,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            dedup_vertices: self.dedup,
        }
    }

    pub fn options(&self) -> WriteOptions {
        WriteOptions { force: self.force }
    }
}

/// A conversion session with its own status registry.
///
/// Sessions share nothing; each latches only its own reports.
#[derive(Debug, Default)]
pub struct Converter {
    registry: StatusRegistry,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a job and latch its report.
    pub fn run(&mut self, job: &ConversionJob) -> ConversionReport {
        let report = match job.mode {
            ConversionMode::Basic => ConversionReport::from_result(
                OperationKind::Basic,
                crate::convert_basic_with(
                    &job.input,
                    &job.output,
                    job.read_options(),
                    job.options(),
                ),
            ),
            ConversionMode::Structured => ConversionReport::from_result(
                OperationKind::Structured,
                crate::convert_structured_with(
                    &job.input,
                    &job.output,
                    job.read_options(),
                    job.options(),
                ),
            ),
            ConversionMode::Directory => ConversionReport::from_batch(crate::convert_directory(
                &job.input,
                &job.output,
                job.options(),
            )),
        };
        self.registry.record(&report);
        report
    }

    /// Parse a file without writing anything and latch the report.
    pub fn parse(&mut self, input: &Path) -> ConversionReport {
        self.parse_with(input, ReadOptions::default())
    }

    pub fn parse_with(&mut self, input: &Path, read: ReadOptions) -> ConversionReport {
        let report =
            ConversionReport::from_result(OperationKind::Parse, crate::parse_with(input, read));
        self.registry.record(&report);
        report
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }
}
