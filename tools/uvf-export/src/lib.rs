//! uvf-export library
//!
//! Reads VTK-family geometry (legacy `.vtk`, XML `.vtp`, STL) and writes UVF
//! output directories: a `manifest.json` hierarchy plus little-endian
//! buffer files.
//!
//! The free functions return `Result`s; [`Converter`] wraps them in
//! [`ConversionReport`]s and remembers the last one per session.

pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod inspect;
pub mod job;
pub mod mesh;
pub mod paths;
pub mod reader;
pub mod status;
pub mod writer;

use std::path::Path;

pub use batch::convert_directory;
pub use error::{ConvertError, ErrorCategory, FormatIssue};
pub use job::{ConversionJob, ConversionMode, Converter};
pub use mesh::{Mesh, PointArray, SourceGroup};
pub use paths::{count_matching_files, is_directory};
pub use reader::{ReadOptions, read_mesh, read_mesh_with};
pub use status::{
    BatchReport, ConversionReport, FileFailure, OperationKind, Statistics, StatusRegistry,
};
pub use writer::WriteOptions;

/// Crate version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Read and validate `input` without writing anything.
pub fn parse(input: &Path) -> Result<Statistics, ConvertError> {
    parse_with(input, ReadOptions::default())
}

pub fn parse_with(input: &Path, read: ReadOptions) -> Result<Statistics, ConvertError> {
    let mesh = read_mesh_with(input, read)?;
    Ok(Statistics {
        points: mesh.point_count(),
        triangles: mesh.triangle_count(),
        files: 1,
        groups: 0,
        operation: OperationKind::Parse,
    })
}

/// Convert one file to `output/uvf.bin` + `output/manifest.json`.
pub fn convert_basic(
    input: &Path,
    output: &Path,
    options: WriteOptions,
) -> Result<Statistics, ConvertError> {
    convert_basic_with(input, output, ReadOptions::default(), options)
}

pub fn convert_basic_with(
    input: &Path,
    output: &Path,
    read: ReadOptions,
    options: WriteOptions,
) -> Result<Statistics, ConvertError> {
    let mesh = read_mesh_with(input, read)?;
    writer::basic::write_basic(&mesh, output, options)?;
    Ok(Statistics {
        points: mesh.point_count(),
        triangles: mesh.triangle_count(),
        files: 1,
        groups: 0,
        operation: OperationKind::Basic,
    })
}

/// Convert one file to a grouped output with one buffer per member.
pub fn convert_structured(
    input: &Path,
    output: &Path,
    options: WriteOptions,
) -> Result<Statistics, ConvertError> {
    convert_structured_with(input, output, ReadOptions::default(), options)
}

pub fn convert_structured_with(
    input: &Path,
    output: &Path,
    read: ReadOptions,
    options: WriteOptions,
) -> Result<Statistics, ConvertError> {
    let mesh = read_mesh_with(input, read)?;
    let groups = writer::structured::write_structured(&mesh, output, options)?;
    Ok(Statistics {
        points: mesh.point_count(),
        triangles: mesh.triangle_count(),
        files: 1,
        groups,
        operation: OperationKind::Structured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_package() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(version().split('.').count(), 3);
    }
}
