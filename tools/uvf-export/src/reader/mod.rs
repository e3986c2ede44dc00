//! Input readers
//!
//! Every reader produces a [`Mesh`]; [`read_mesh`] picks one from the file
//! extension and validates the result before returning it.

mod legacy;
mod stl;
mod xml;

use std::fs;
use std::path::Path;

use crate::error::{ConvertError, FormatIssue};
use crate::mesh::Mesh;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Legacy `.vtk` (ASCII)
    LegacyVtk,
    /// VTK XML PolyData `.vtp`
    XmlPolyData,
    /// `.stl`, ASCII or binary
    Stl,
}

impl InputFormat {
    /// Format implied by a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vtk" => Some(InputFormat::LegacyVtk),
            "vtp" => Some(InputFormat::XmlPolyData),
            "stl" => Some(InputFormat::Stl),
            _ => None,
        }
    }
}

/// Reader settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Merge bitwise-identical STL vertices within each solid.
    pub dedup_vertices: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            dedup_vertices: true,
        }
    }
}

/// Read and validate a mesh file with default options.
pub fn read_mesh(path: &Path) -> Result<Mesh, ConvertError> {
    read_mesh_with(path, ReadOptions::default())
}

/// Read and validate a mesh file.
pub fn read_mesh_with(path: &Path, options: ReadOptions) -> Result<Mesh, ConvertError> {
    let bytes = fs::read(path).map_err(|e| ConvertError::read(path, e))?;

    let format = match InputFormat::from_path(path) {
        Some(format) => format,
        None if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<') => {
            InputFormat::XmlPolyData
        }
        None => {
            return Err(ConvertError::format(
                path,
                FormatIssue::Unsupported("unrecognized file extension".into()),
            ));
        }
    };

    let mesh = parse_bytes(format, &bytes, options).map_err(|issue| ConvertError::format(path, issue))?;
    mesh.validate()
        .map_err(|issue| ConvertError::format(path, issue))?;

    tracing::debug!(
        "Read {} ({:?}): {} points, {} triangles",
        path.display(),
        format,
        mesh.point_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn parse_bytes(
    format: InputFormat,
    bytes: &[u8],
    options: ReadOptions,
) -> Result<Mesh, FormatIssue> {
    match format {
        InputFormat::LegacyVtk => legacy::parse_legacy(&String::from_utf8_lossy(bytes)),
        InputFormat::XmlPolyData => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| FormatIssue::Malformed(format!("invalid UTF-8: {e}")))?;
            xml::parse_vtp(text)
        }
        InputFormat::Stl => stl::parse_stl(bytes, options.dedup_vertices),
    }
}
