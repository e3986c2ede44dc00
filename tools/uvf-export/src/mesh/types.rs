//! In-memory mesh produced by every reader

use std::ops::Range;

use crate::error::FormatIssue;

/// Named per-point attribute array (scalars, vectors, normals, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PointArray {
    pub name: String,
    /// Components per tuple (1 for scalars, 3 for vectors)
    pub components: u32,
    /// Tuple-major values, `components` per tuple
    pub values: Vec<f32>,
}

impl PointArray {
    pub fn new(name: impl Into<String>, components: u32, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            components,
            values,
        }
    }

    pub fn tuple_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components as usize
        }
    }
}

/// Grouping recorded by the source file itself (e.g. STL `solid` blocks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGroup {
    pub name: String,
    /// Contiguous range into [`Mesh::triangles`]
    pub triangles: Range<usize>,
}

/// Points, triangulated polygons, polylines and point data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub points: Vec<[f32; 3]>,
    /// Polygons and strips, already triangulated
    pub triangles: Vec<[u32; 3]>,
    /// Polylines as point index lists
    pub lines: Vec<Vec<u32>>,
    pub point_data: Vec<PointArray>,
    pub source_groups: Vec<SourceGroup>,
}

impl Mesh {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn has_polygons(&self) -> bool {
        !self.triangles.is_empty()
    }

    pub fn has_lines(&self) -> bool {
        self.lines.iter().any(|l| l.len() >= 2)
    }

    /// Check the structural invariants every writer relies on.
    pub fn validate(&self) -> Result<(), FormatIssue> {
        if self.points.is_empty() {
            return Err(FormatIssue::NoPoints);
        }
        let count = self.points.len();
        let out_of_range = self
            .triangles
            .iter()
            .flatten()
            .chain(self.lines.iter().flatten())
            .find(|&&i| i as usize >= count);
        if let Some(&index) = out_of_range {
            return Err(FormatIssue::IndexOutOfRange {
                index: u64::from(index),
                count,
            });
        }
        for group in &self.source_groups {
            if group.triangles.start > group.triangles.end
                || group.triangles.end > self.triangles.len()
            {
                return Err(FormatIssue::Malformed(format!(
                    "group '{}' covers triangles {:?} of {}",
                    group.name,
                    group.triangles,
                    self.triangles.len()
                )));
            }
        }
        Ok(())
    }

    /// Index buffer written to UVF: triangles, or for line-only data each
    /// segment `a-b` as the degenerate triangle `(a, b, b)`.
    pub fn index_buffer(&self) -> Vec<u32> {
        if self.has_polygons() {
            return bytemuck::cast_slice::<[u32; 3], u32>(&self.triangles).to_vec();
        }
        let mut indices = Vec::new();
        for line in &self.lines {
            for seg in line.windows(2) {
                indices.extend_from_slice(&[seg[0], seg[1], seg[1]]);
            }
        }
        indices
    }

    /// Number of index triplets in [`Mesh::index_buffer`].
    pub fn triangle_count(&self) -> usize {
        if self.has_polygons() {
            self.triangles.len()
        } else {
            self.lines
                .iter()
                .map(|l| l.len().saturating_sub(1))
                .sum()
        }
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` slice.
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }

    /// Axis-aligned bounds, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(mut lo, mut hi), p| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            (lo, hi)
        }))
    }

    /// Copy out a range of triangles as a standalone mesh.
    ///
    /// Only points referenced by the range are kept (in first-use order).
    /// Point arrays with one tuple per point are remapped; others are dropped.
    pub fn extract_triangles(&self, range: Range<usize>) -> Mesh {
        let mut remap: Vec<Option<u32>> = vec![None; self.points.len()];
        let mut kept: Vec<usize> = Vec::new();
        let triangles: Vec<[u32; 3]> = self.triangles[range]
            .iter()
            .map(|tri| {
                tri.map(|i| {
                    *remap[i as usize].get_or_insert_with(|| {
                        kept.push(i as usize);
                        (kept.len() - 1) as u32
                    })
                })
            })
            .collect();

        let point_data: Vec<PointArray> = self
            .point_data
            .iter()
            .filter(|a| a.tuple_count() == self.points.len() && a.components > 0)
            .map(|a| {
                let n = a.components as usize;
                let values = kept
                    .iter()
                    .flat_map(|&p| a.values[p * n..(p + 1) * n].iter().copied())
                    .collect();
                PointArray::new(a.name.clone(), a.components, values)
            })
            .collect();

        Mesh {
            points: kept.iter().map(|&i| self.points[i]).collect(),
            triangles,
            lines: Vec::new(),
            point_data,
            source_groups: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh {
            points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            point_data: vec![PointArray::new("t", 1, vec![10.0, 11.0, 12.0, 13.0])],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut mesh = quad();
        assert!(mesh.validate().is_ok());
        mesh.triangles.push([0, 1, 4]);
        assert_eq!(
            mesh.validate(),
            Err(FormatIssue::IndexOutOfRange { index: 4, count: 4 })
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_line() {
        let mut mesh = quad();
        mesh.lines.push(vec![0, 7]);
        assert!(matches!(
            mesh.validate(),
            Err(FormatIssue::IndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(Mesh::default().validate(), Err(FormatIssue::NoPoints));
    }

    #[test]
    fn test_line_index_buffer_is_degenerate_triangles() {
        let mesh = Mesh {
            points: vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            lines: vec![vec![0, 1, 2]],
            ..Default::default()
        };
        assert_eq!(mesh.index_buffer(), vec![0, 1, 1, 1, 2, 2]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_polygons_take_precedence_over_lines() {
        let mut mesh = quad();
        mesh.lines.push(vec![0, 1]);
        assert_eq!(mesh.index_buffer(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_bounds() {
        let (lo, hi) = quad().bounds().unwrap();
        assert_eq!(lo, [0.0, 0.0, 0.0]);
        assert_eq!(hi, [1.0, 1.0, 0.0]);
        assert!(Mesh::default().bounds().is_none());
    }

    #[test]
    fn test_extract_triangles_compacts_points() {
        let mesh = quad();
        let part = mesh.extract_triangles(1..2);
        assert_eq!(part.triangles, vec![[0, 1, 2]]);
        assert_eq!(part.points, vec![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(part.point_data[0].values, vec![10.0, 12.0, 13.0]);
        assert!(part.validate().is_ok());
    }
}
