//! Flat single-buffer output

use std::path::Path;

use uvf_common::{GeometryKind, ManifestNode, UVF_LAYOUT};

use super::{WriteOptions, encode_mesh, prepare_output, sanitize_label, write_file, write_manifest};
use crate::classify::classify_mesh;
use crate::error::ConvertError;
use crate::mesh::Mesh;

/// Id of the single face written in basic mode.
const BASIC_FACE_ID: &str = "uvf";

/// Faces of a basic output as `(id, start, end)` index element ranges.
///
/// Meshes read from multi-solid sources get one face per solid, each
/// covering that solid's slice of the shared index buffer.
fn face_ranges(mesh: &Mesh, index_count: u64) -> Vec<(String, u64, u64)> {
    if mesh.source_groups.is_empty() || !mesh.has_polygons() {
        return vec![(BASIC_FACE_ID.to_string(), 0, index_count)];
    }
    mesh.source_groups
        .iter()
        .enumerate()
        .map(|(seq, group)| {
            (
                format!("{}-{}", sanitize_label(&group.name), seq),
                group.triangles.start as u64 * 3,
                group.triangles.end as u64 * 3,
            )
        })
        .collect()
}

/// Write `mesh` as `uvf.bin` + a manifest with one solid and its faces.
///
/// Returns the kind the geometry was classified as.
pub fn write_basic(
    mesh: &Mesh,
    output: &Path,
    options: WriteOptions,
) -> Result<GeometryKind, ConvertError> {
    prepare_output(output, options)?;

    let kind = classify_mesh(mesh, BASIC_FACE_ID);
    let (bytes, sections) = encode_mesh(mesh);
    let index_count = sections
        .first()
        .map_or(0, |indices| indices.element_count());
    write_file(&output.join(UVF_LAYOUT.basic_buffer_file), &bytes)?;

    let group = kind.group_id();
    let faces = face_ranges(mesh, index_count);
    let mut nodes = vec![
        ManifestNode::root_group(vec![group.to_string()]),
        ManifestNode::solid_geometry_with_faces(
            group,
            kind,
            faces.iter().map(|(id, _, _)| id.clone()).collect(),
            UVF_LAYOUT.basic_buffer_file,
            sections,
        ),
    ];
    nodes.extend(
        faces
            .iter()
            .map(|(id, start, end)| ManifestNode::face_range(id, group, kind, *start, *end)),
    );
    write_manifest(output, &nodes)?;

    tracing::info!(
        "Wrote basic UVF to {}: {} points, {} triangles, kind={}",
        output.display(),
        mesh.point_count(),
        mesh.triangle_count(),
        kind
    );
    Ok(kind)
}
