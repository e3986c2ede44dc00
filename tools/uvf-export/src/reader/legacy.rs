//! Legacy VTK reader (`.vtk`, ASCII)
//!
//! Supports `DATASET POLYDATA` and `DATASET UNSTRUCTURED_GRID`, with cell
//! arrays in either the classic `n size` + `k i0 .. ik` layout or the 5.x
//! `OFFSETS` / `CONNECTIVITY` layout. Unstructured grids keep surface cells
//! as-is and reduce volumetric cells to their boundary faces.

use crate::error::FormatIssue;
use crate::mesh::topology::{BoundaryFaces, triangulate_fan, triangulate_strip};
use crate::mesh::{Mesh, PointArray};

type Result<T> = std::result::Result<T, FormatIssue>;

/// VTK cell type ids
mod cell_type {
    pub const VERTEX: u32 = 1;
    pub const POLY_VERTEX: u32 = 2;
    pub const LINE: u32 = 3;
    pub const POLY_LINE: u32 = 4;
    pub const TRIANGLE: u32 = 5;
    pub const TRIANGLE_STRIP: u32 = 6;
    pub const POLYGON: u32 = 7;
    pub const PIXEL: u32 = 8;
    pub const QUAD: u32 = 9;
    pub const TETRA: u32 = 10;
    pub const VOXEL: u32 = 11;
    pub const HEXAHEDRON: u32 = 12;
    pub const WEDGE: u32 = 13;
    pub const PYRAMID: u32 = 14;
}

const TETRA_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];
const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 4, 7, 3],
    &[1, 2, 6, 5],
    &[0, 1, 5, 4],
    &[3, 7, 6, 2],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];
/// Voxel point order mapped onto hexahedron order
const VOXEL_TO_HEXAHEDRON: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];
const WEDGE_FACES: &[&[usize]] = &[
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];
const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dataset {
    PolyData,
    UnstructuredGrid,
}

/// Which attribute block subsequent SCALARS/VECTORS/... belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeTarget {
    None,
    Point(usize),
    Cell(usize),
}

impl AttributeTarget {
    fn tuples(self) -> usize {
        match self {
            AttributeTarget::None => 0,
            AttributeTarget::Point(n) | AttributeTarget::Cell(n) => n,
        }
    }
}

/// Whitespace tokens tagged with their source line.
struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &str) -> Result<&'a str> {
        let (_, tok) = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| FormatIssue::Truncated(what.to_string()))?;
        self.pos += 1;
        Ok(tok)
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|(_, t)| *t)
    }

    /// Next token, only if it sits on the same line as the previous one.
    fn next_on_same_line(&mut self) -> Option<&'a str> {
        let prev_line = self.tokens.get(self.pos.checked_sub(1)?)?.0;
        let (line, tok) = *self.tokens.get(self.pos)?;
        if line == prev_line {
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn usize(&mut self, what: &str) -> Result<usize> {
        let tok = self.next(what)?;
        tok.parse()
            .map_err(|_| FormatIssue::Malformed(format!("expected count for {what}, got '{tok}'")))
    }

    fn index(&mut self, what: &str) -> Result<u32> {
        let tok = self.next(what)?;
        let value: i64 = tok
            .parse()
            .map_err(|_| FormatIssue::Malformed(format!("expected index in {what}, got '{tok}'")))?;
        u32::try_from(value)
            .map_err(|_| FormatIssue::Malformed(format!("index {value} in {what} is out of range")))
    }

    /// Tokens not yet consumed; bounds every preallocation.
    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    fn indices(&mut self, count: usize, what: &str) -> Result<Vec<u32>> {
        let mut ids = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            ids.push(self.index(what)?);
        }
        Ok(ids)
    }

    fn floats(&mut self, count: usize, what: &str) -> Result<Vec<f32>> {
        let mut values = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            let tok = self.next(what)?;
            let v: f64 = tok
                .parse()
                .map_err(|_| FormatIssue::Malformed(format!("expected number in {what}, got '{tok}'")))?;
            values.push(v as f32);
        }
        Ok(values)
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        let tok = self.next(keyword)?;
        if tok.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(FormatIssue::Malformed(format!(
                "expected '{keyword}', got '{tok}'"
            )))
        }
    }
}

/// `a * b` for counts read from the file.
fn checked_count(a: usize, b: usize, what: &str) -> Result<usize> {
    a.checked_mul(b)
        .ok_or_else(|| FormatIssue::Malformed(format!("{what} count {a} x {b} is too large")))
}

/// Parse a legacy ASCII VTK file.
pub(crate) fn parse_legacy(text: &str) -> Result<Mesh> {
    let mut lines = text.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| FormatIssue::Truncated("file header".into()))?;
    if !header.trim_start().starts_with("# vtk DataFile") {
        return Err(FormatIssue::Malformed(
            "missing '# vtk DataFile Version' header".into(),
        ));
    }
    lines
        .next()
        .ok_or_else(|| FormatIssue::Truncated("title line".into()))?;
    let (_, encoding) = lines
        .next()
        .ok_or_else(|| FormatIssue::Truncated("ASCII/BINARY line".into()))?;
    match encoding.trim().to_ascii_uppercase().as_str() {
        "ASCII" => {}
        "BINARY" => {
            return Err(FormatIssue::Unsupported(
                "binary legacy VTK files (re-save as ASCII or .vtp)".into(),
            ));
        }
        other => {
            return Err(FormatIssue::Malformed(format!(
                "expected ASCII or BINARY, got '{other}'"
            )));
        }
    }

    // Tokenize the remainder, skipping METADATA blocks (terminated by a blank line)
    let mut tokens = Vec::new();
    let mut in_metadata = false;
    for (line_no, line) in lines {
        let trimmed = line.trim();
        if in_metadata {
            in_metadata = !trimmed.is_empty();
            continue;
        }
        if trimmed.eq_ignore_ascii_case("METADATA") {
            in_metadata = true;
            continue;
        }
        tokens.extend(trimmed.split_whitespace().map(|t| (line_no, t)));
    }
    let mut tokens = Tokens { tokens, pos: 0 };

    tokens.expect_keyword("DATASET")?;
    let dataset = match tokens.next("dataset type")?.to_ascii_uppercase().as_str() {
        "POLYDATA" => Dataset::PolyData,
        "UNSTRUCTURED_GRID" => Dataset::UnstructuredGrid,
        other => {
            return Err(FormatIssue::Unsupported(format!(
                "dataset type {other} (only POLYDATA and UNSTRUCTURED_GRID)"
            )));
        }
    };

    let mut mesh = Mesh::default();
    let mut cells: Vec<Vec<u32>> = Vec::new();
    let mut cell_types: Vec<u32> = Vec::new();
    let mut target = AttributeTarget::None;

    while !tokens.is_empty() {
        let keyword = tokens.next("section keyword")?.to_ascii_uppercase();
        match keyword.as_str() {
            "POINTS" => {
                let n = tokens.usize("POINTS")?;
                tokens.next("POINTS data type")?;
                let flat = tokens.floats(checked_count(n, 3, "POINTS")?, "POINTS")?;
                mesh.points = flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
            }
            "POLYGONS" => {
                for cell in read_cells(&mut tokens, "POLYGONS")? {
                    triangulate_fan(&cell, &mut mesh.triangles);
                }
            }
            "TRIANGLE_STRIPS" => {
                for cell in read_cells(&mut tokens, "TRIANGLE_STRIPS")? {
                    triangulate_strip(&cell, &mut mesh.triangles);
                }
            }
            "LINES" => {
                mesh.lines.extend(read_cells(&mut tokens, "LINES")?);
            }
            "VERTICES" => {
                read_cells(&mut tokens, "VERTICES")?;
            }
            "CELLS" => {
                cells = read_cells(&mut tokens, "CELLS")?;
            }
            "CELL_TYPES" => {
                let n = tokens.usize("CELL_TYPES")?;
                cell_types = tokens.indices(n, "CELL_TYPES")?;
            }
            "POINT_DATA" => {
                let n = tokens.usize("POINT_DATA")?;
                target = AttributeTarget::Point(n);
            }
            "CELL_DATA" => {
                let n = tokens.usize("CELL_DATA")?;
                target = AttributeTarget::Cell(n);
            }
            "FIELD" => {
                for array in read_field(&mut tokens)? {
                    attach(&mut mesh, target, array);
                }
            }
            "LOOKUP_TABLE" => {
                tokens.next("LOOKUP_TABLE name")?;
                let size = tokens.usize("LOOKUP_TABLE size")?;
                tokens.floats(checked_count(size, 4, "LOOKUP_TABLE")?, "LOOKUP_TABLE")?;
            }
            "SCALARS" | "COLOR_SCALARS" | "VECTORS" | "NORMALS" | "TEXTURE_COORDINATES"
            | "TENSORS" => {
                let array = read_attribute(&mut tokens, &keyword, target.tuples())?;
                attach(&mut mesh, target, array);
            }
            other => {
                return Err(FormatIssue::Malformed(format!("unknown keyword '{other}'")));
            }
        }
    }

    if dataset == Dataset::UnstructuredGrid {
        if cells.len() != cell_types.len() {
            return Err(FormatIssue::Malformed(format!(
                "{} cells but {} cell types",
                cells.len(),
                cell_types.len()
            )));
        }
        extract_grid_surface(&cells, &cell_types, &mut mesh)?;
    }

    tracing::debug!(
        "Legacy VTK: {} points, {} triangles, {} lines, {} point arrays",
        mesh.points.len(),
        mesh.triangles.len(),
        mesh.lines.len(),
        mesh.point_data.len()
    );

    Ok(mesh)
}

/// Read a cell array in either the classic or the OFFSETS/CONNECTIVITY layout.
fn read_cells(tokens: &mut Tokens<'_>, what: &str) -> Result<Vec<Vec<u32>>> {
    let n = tokens.usize(what)?;
    let size = tokens.usize(what)?;

    if tokens
        .peek()
        .is_some_and(|t| t.eq_ignore_ascii_case("OFFSETS"))
    {
        tokens.next(what)?;
        tokens.next("OFFSETS data type")?;
        let offsets = tokens.indices(n, "OFFSETS")?;
        tokens.expect_keyword("CONNECTIVITY")?;
        tokens.next("CONNECTIVITY data type")?;
        let connectivity = tokens.indices(size, "CONNECTIVITY")?;
        return offsets
            .windows(2)
            .map(|w| {
                let (start, end) = (w[0] as usize, w[1] as usize);
                connectivity.get(start..end).map(<[u32]>::to_vec).ok_or_else(|| {
                    FormatIssue::Malformed(format!(
                        "{what} offsets {start}..{end} exceed connectivity length {size}"
                    ))
                })
            })
            .collect();
    }

    let mut cells = Vec::with_capacity(n.min(tokens.remaining()));
    let mut consumed = 0usize;
    for _ in 0..n {
        let k = tokens.usize(what)?;
        let cell = tokens.indices(k, what)?;
        consumed = consumed.saturating_add(k).saturating_add(1);
        cells.push(cell);
    }
    if consumed != size {
        return Err(FormatIssue::Malformed(format!(
            "{what} declares size {size} but contains {consumed} values"
        )));
    }
    Ok(cells)
}

/// Read SCALARS / COLOR_SCALARS / VECTORS / NORMALS / TEXTURE_COORDINATES / TENSORS.
fn read_attribute(tokens: &mut Tokens<'_>, keyword: &str, tuples: usize) -> Result<PointArray> {
    let name = tokens.next(keyword)?.to_string();
    let components = match keyword {
        "SCALARS" => {
            tokens.next("SCALARS data type")?;
            let components = match tokens.next_on_same_line() {
                Some(tok) => tok.parse().map_err(|_| {
                    FormatIssue::Malformed(format!("bad component count '{tok}' for {name}"))
                })?,
                None => 1,
            };
            if tokens
                .peek()
                .is_some_and(|t| t.eq_ignore_ascii_case("LOOKUP_TABLE"))
            {
                tokens.next("LOOKUP_TABLE")?;
                tokens.next("LOOKUP_TABLE name")?;
            }
            components
        }
        "COLOR_SCALARS" => tokens.usize("COLOR_SCALARS components")? as u32,
        "VECTORS" | "NORMALS" => {
            tokens.next("data type")?;
            3
        }
        "TEXTURE_COORDINATES" => {
            let dim = tokens.usize("TEXTURE_COORDINATES dimension")? as u32;
            tokens.next("data type")?;
            dim
        }
        // TENSORS
        _ => {
            tokens.next("data type")?;
            9
        }
    };
    let count = checked_count(tuples, components as usize, keyword)?;
    let values = tokens.floats(count, keyword)?;
    Ok(PointArray::new(name, components, values))
}

/// Read `FIELD name count` followed by `count` arrays.
fn read_field(tokens: &mut Tokens<'_>) -> Result<Vec<PointArray>> {
    tokens.next("FIELD name")?;
    let count = tokens.usize("FIELD array count")?;
    let mut arrays = Vec::with_capacity(count.min(tokens.remaining()));
    for _ in 0..count {
        let name = tokens.next("FIELD array name")?;
        if name.eq_ignore_ascii_case("NULL_ARRAY") {
            continue;
        }
        let components = tokens.usize("FIELD components")?;
        let tuples = tokens.usize("FIELD tuples")?;
        tokens.next("FIELD data type")?;
        let values = tokens.floats(checked_count(components, tuples, name)?, name)?;
        arrays.push(PointArray::new(name, components as u32, values));
    }
    Ok(arrays)
}

/// Keep point arrays with one tuple per point; discard everything else.
fn attach(mesh: &mut Mesh, target: AttributeTarget, array: PointArray) {
    match target {
        AttributeTarget::Point(_) if array.tuple_count() == mesh.points.len() => {
            mesh.point_data.push(array);
        }
        AttributeTarget::Point(_) => {
            tracing::warn!(
                "Skipping point array '{}': {} tuples for {} points",
                array.name,
                array.tuple_count(),
                mesh.points.len()
            );
        }
        AttributeTarget::Cell(_) | AttributeTarget::None => {}
    }
}

fn require_ids(cell: &[u32], needed: usize, kind: u32) -> Result<()> {
    if cell.len() < needed {
        return Err(FormatIssue::Malformed(format!(
            "cell type {kind} needs {needed} points, got {}",
            cell.len()
        )));
    }
    Ok(())
}

/// Convert unstructured cells into triangles and lines.
fn extract_grid_surface(cells: &[Vec<u32>], types: &[u32], mesh: &mut Mesh) -> Result<()> {
    let mut volume_faces = BoundaryFaces::default();
    let mut skipped = 0usize;

    for (cell, &kind) in cells.iter().zip(types) {
        let faces: &[&[usize]] = match kind {
            cell_type::VERTEX | cell_type::POLY_VERTEX => continue,
            cell_type::LINE | cell_type::POLY_LINE => {
                mesh.lines.push(cell.clone());
                continue;
            }
            cell_type::TRIANGLE | cell_type::POLYGON | cell_type::QUAD => {
                triangulate_fan(cell, &mut mesh.triangles);
                continue;
            }
            cell_type::TRIANGLE_STRIP => {
                triangulate_strip(cell, &mut mesh.triangles);
                continue;
            }
            cell_type::PIXEL => {
                require_ids(cell, 4, kind)?;
                triangulate_fan(&[cell[0], cell[1], cell[3], cell[2]], &mut mesh.triangles);
                continue;
            }
            cell_type::TETRA => TETRA_FACES,
            cell_type::VOXEL | cell_type::HEXAHEDRON => HEXAHEDRON_FACES,
            cell_type::WEDGE => WEDGE_FACES,
            cell_type::PYRAMID => PYRAMID_FACES,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let corners: Vec<u32> = if kind == cell_type::VOXEL {
            require_ids(cell, 8, kind)?;
            VOXEL_TO_HEXAHEDRON.iter().map(|&i| cell[i]).collect()
        } else {
            let needed = faces.iter().flat_map(|f| f.iter()).max().map_or(0, |m| m + 1);
            require_ids(cell, needed, kind)?;
            cell.clone()
        };
        for face in faces {
            volume_faces.add(face.iter().map(|&i| corners[i]).collect());
        }
    }

    for face in volume_faces.into_boundary() {
        triangulate_fan(&face, &mut mesh.triangles);
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} cells of unsupported type", skipped);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_POLYDATA: &str = "\
# vtk DataFile Version 3.0
single triangle
ASCII
DATASET POLYDATA
POINTS 3 float
0 0 0  1 0 0  0 1 0
POLYGONS 1 4
3 0 1 2
POINT_DATA 3
SCALARS temperature float
LOOKUP_TABLE default
1.5 2.5 3.5
VECTORS velocity float
1 0 0 0 1 0 0 0 1
";

    #[test]
    fn test_polydata_triangle() {
        let mesh = parse_legacy(TRIANGLE_POLYDATA).unwrap();
        assert_eq!(mesh.points.len(), 3);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert_eq!(mesh.point_data.len(), 2);
        assert_eq!(mesh.point_data[0].name, "temperature");
        assert_eq!(mesh.point_data[0].values, vec![1.5, 2.5, 3.5]);
        assert_eq!(mesh.point_data[1].components, 3);
    }

    #[test]
    fn test_scalars_without_lookup_table_or_components() {
        // The first value must not be mistaken for a component count
        let text = "\
# vtk DataFile Version 3.0
t
ASCII
DATASET POLYDATA
POINTS 2 float
0 0 0 1 1 1
POINT_DATA 2
SCALARS p double
4 5
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(mesh.point_data[0].components, 1);
        assert_eq!(mesh.point_data[0].values, vec![4.0, 5.0]);
    }

    #[test]
    fn test_quad_and_strip_triangulation() {
        let text = "\
# vtk DataFile Version 3.0
quad
ASCII
DATASET POLYDATA
POINTS 5 float
0 0 0 1 0 0 1 1 0 0 1 0 2 2 0
POLYGONS 1 5
4 0 1 2 3
TRIANGLE_STRIPS 1 5
4 0 1 2 4
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(
            mesh.triangles,
            vec![[0, 1, 2], [0, 2, 3], [0, 1, 2], [2, 1, 4]]
        );
    }

    #[test]
    fn test_vtk5_offsets_connectivity() {
        let text = "\
# vtk DataFile Version 5.1
new layout
ASCII
DATASET POLYDATA
POINTS 4 float
0 0 0 1 0 0 1 1 0 0 1 0
METADATA
INFORMATION 0

POLYGONS 3 6
OFFSETS vtktypeint64
0 3 6
CONNECTIVITY vtktypeint64
0 1 2 0 2 3
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_lines_and_cell_data_are_handled() {
        let text = "\
# vtk DataFile Version 3.0
lines
ASCII
DATASET POLYDATA
POINTS 3 float
0 0 0 1 0 0 2 0 0
LINES 1 4
3 0 1 2
CELL_DATA 1
SCALARS id int 1
LOOKUP_TABLE default
7
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(mesh.lines, vec![vec![0, 1, 2]]);
        assert!(mesh.triangles.is_empty());
        assert!(mesh.point_data.is_empty(), "cell data must not become point data");
    }

    #[test]
    fn test_field_data() {
        let text = "\
# vtk DataFile Version 3.0
field
ASCII
DATASET POLYDATA
POINTS 2 float
0 0 0 1 0 0
POINT_DATA 2
FIELD FieldData 2
pressure 1 2 float
10 20
velocity 2 2 float
1 2 3 4
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(mesh.point_data.len(), 2);
        assert_eq!(mesh.point_data[1].name, "velocity");
        assert_eq!(mesh.point_data[1].components, 2);
    }

    #[test]
    fn test_unstructured_tetra_boundary() {
        // Two tetrahedra sharing face (1,2,3): 8 faces, 2 interior
        let text = "\
# vtk DataFile Version 3.0
tets
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 5 float
0 0 0 1 0 0 0 1 0 0 0 1 1 1 1
CELLS 2 10
4 0 1 2 3
4 4 1 3 2
CELL_TYPES 2
10
10
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(mesh.triangles.len(), 6);
        let shared = {
            let mut k = [1u32, 2, 3];
            k.sort();
            k
        };
        assert!(mesh.triangles.iter().all(|t| {
            let mut k = *t;
            k.sort();
            k != shared
        }));
    }

    #[test]
    fn test_unstructured_mixed_cells() {
        let text = "\
# vtk DataFile Version 3.0
mixed
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 4 float
0 0 0 1 0 0 1 1 0 0 1 0
CELLS 3 10
3 0 1 2
2 2 3
1 0
CELL_TYPES 3
5
3
1
";
        let mesh = parse_legacy(text).unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert_eq!(mesh.lines, vec![vec![2, 3]]);
    }

    #[test]
    fn test_rejects_bad_header() {
        let err = parse_legacy("hello\nworld\nASCII\n").unwrap_err();
        assert!(matches!(err, FormatIssue::Malformed(_)));
    }

    #[test]
    fn test_rejects_binary() {
        let text = "# vtk DataFile Version 3.0\nt\nBINARY\nDATASET POLYDATA\n";
        assert!(matches!(
            parse_legacy(text),
            Err(FormatIssue::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_structured_points() {
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET STRUCTURED_POINTS\n";
        assert!(matches!(
            parse_legacy(text),
            Err(FormatIssue::Unsupported(_))
        ));
    }

    #[test]
    fn test_truncated_points() {
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\nPOINTS 3 float\n0 0 0 1 0\n";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Truncated(_))));
    }

    #[test]
    fn test_huge_point_count_is_malformed() {
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\n\
                    POINTS 6148914691236517206 float\n0 0 0\n";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Malformed(_))));
    }

    #[test]
    fn test_huge_cell_count_does_not_preallocate() {
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET UNSTRUCTURED_GRID\n\
                    POINTS 1 float\n0 0 0\nCELLS 4611686018427387904 1\n1 0\n";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Truncated(_))));

        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET UNSTRUCTURED_GRID\n\
                    POINTS 1 float\n0 0 0\nCELL_TYPES 4611686018427387904\n1\n";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Truncated(_))));
    }

    #[test]
    fn test_huge_attribute_counts_are_malformed() {
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\n\
                    POINTS 1 float\n0 0 0\nPOINT_DATA 9223372036854775807\n\
                    SCALARS p float 4\n1\n";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Malformed(_))));

        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\n\
                    POINTS 1 float\n0 0 0\nPOINT_DATA 1\nFIELD f 1\n\
                    a 9223372036854775807 3 float\n1\n";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Malformed(_))));
    }

    #[test]
    fn test_cell_size_mismatch() {
        let text = "\
# vtk DataFile Version 3.0
t
ASCII
DATASET POLYDATA
POINTS 3 float
0 0 0 1 0 0 0 1 0
POLYGONS 1 5
3 0 1 2
";
        assert!(matches!(parse_legacy(text), Err(FormatIssue::Malformed(_))));
    }
}
