//! Cell-to-triangle helpers shared by the readers

use hashbrown::HashMap;

/// Fan-triangulate a convex polygon. Cells with fewer than 3 ids are skipped.
pub(crate) fn triangulate_fan(ids: &[u32], out: &mut Vec<[u32; 3]>) {
    if ids.len() < 3 {
        return;
    }
    for j in 1..ids.len() - 1 {
        out.push([ids[0], ids[j], ids[j + 1]]);
    }
}

/// Triangulate a triangle strip, flipping every other triangle so all
/// triangles keep the strip's winding.
pub(crate) fn triangulate_strip(ids: &[u32], out: &mut Vec<[u32; 3]>) {
    for (i, w) in ids.windows(3).enumerate() {
        if i % 2 == 0 {
            out.push([w[0], w[1], w[2]]);
        } else {
            out.push([w[1], w[0], w[2]]);
        }
    }
}

/// Collects faces of volumetric cells and keeps only those on the boundary
/// (faces referenced by exactly one cell).
#[derive(Debug, Default)]
pub(crate) struct BoundaryFaces {
    /// Sorted ids -> (first-seen order, use count, original winding)
    faces: HashMap<Vec<u32>, (usize, u32, Vec<u32>)>,
}

impl BoundaryFaces {
    pub(crate) fn add(&mut self, face: Vec<u32>) {
        let mut key = face.clone();
        key.sort_unstable();
        let next = self.faces.len();
        self.faces
            .entry(key)
            .and_modify(|entry| entry.1 += 1)
            .or_insert((next, 1, face));
    }

    /// Boundary faces in the order they were first seen.
    pub(crate) fn into_boundary(self) -> Vec<Vec<u32>> {
        let mut boundary: Vec<(usize, Vec<u32>)> = self
            .faces
            .into_values()
            .filter(|(_, count, _)| *count == 1)
            .map(|(order, _, face)| (order, face))
            .collect();
        boundary.sort_unstable_by_key(|(order, _)| *order);
        boundary.into_iter().map(|(_, face)| face).collect()
    }
}
