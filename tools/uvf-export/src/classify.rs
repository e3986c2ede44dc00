//! Geometry kind heuristics

use uvf_common::GeometryKind;

use crate::mesh::Mesh;

/// Relative bbox thickness below which geometry counts as planar.
const PLANAR_TOLERANCE: f32 = 0.01;

/// Classify a mesh by its topology, extent and naming.
///
/// - polylines without polygons: streamline
/// - any bbox axis thinner than 1% of the diagonal: slice
/// - polygons with point data where `name` or a field mentions "iso": isosurface
/// - otherwise: surface
pub fn classify_mesh(mesh: &Mesh, name: &str) -> GeometryKind {
    if mesh.has_lines() && !mesh.has_polygons() {
        return GeometryKind::Streamline;
    }

    if let Some((lo, hi)) = mesh.bounds() {
        let extent = [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]];
        let diag = extent.iter().map(|e| e * e).sum::<f32>().sqrt();
        let eps = diag * PLANAR_TOLERANCE + 1e-6;
        if diag > 0.0 && extent.iter().any(|&e| e < eps) {
            return GeometryKind::Slice;
        }
    }

    if mesh.has_polygons() && !mesh.point_data.is_empty() {
        let mentions_iso = |s: &str| s.to_lowercase().contains("iso");
        if mentions_iso(name) || mesh.point_data.iter().any(|a| mentions_iso(&a.name)) {
            return GeometryKind::Isosurface;
        }
    }

    GeometryKind::Surface
}

/// Group a label falls into, `surfaces` when no keyword matches.
pub fn classify_label(label: &str) -> GeometryKind {
    GeometryKind::from_label(label).unwrap_or(GeometryKind::Surface)
}
