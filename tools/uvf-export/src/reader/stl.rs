//! STL reader (ASCII and binary)
//!
//! Vertices are shared between facets of the same solid when their
//! coordinates are bitwise identical; solids never share vertices. Every
//! `solid ... endsolid` block becomes a [`SourceGroup`].

use hashbrown::HashMap;

use crate::error::FormatIssue;
use crate::mesh::topology::triangulate_fan;
use crate::mesh::{Mesh, SourceGroup};

type Result<T> = std::result::Result<T, FormatIssue>;

const BINARY_HEADER_LEN: usize = 80;
const BINARY_FACET_LEN: usize = 50;

/// Builds a mesh, optionally merging identical vertices within a solid.
struct MeshBuilder {
    mesh: Mesh,
    dedup: bool,
    lookup: HashMap<[u32; 3], u32>,
}

impl MeshBuilder {
    fn new(dedup: bool) -> Self {
        Self {
            mesh: Mesh::default(),
            dedup,
            lookup: HashMap::new(),
        }
    }

    /// Start a new solid; vertices seen so far are no longer merge targets.
    fn open_group(&mut self) -> usize {
        self.lookup.clear();
        self.mesh.triangles.len()
    }

    fn vertex(&mut self, p: [f32; 3]) -> u32 {
        if !self.dedup {
            self.mesh.points.push(p);
            return (self.mesh.points.len() - 1) as u32;
        }
        let key = p.map(f32::to_bits);
        let points = &mut self.mesh.points;
        *self.lookup.entry(key).or_insert_with(|| {
            points.push(p);
            (points.len() - 1) as u32
        })
    }

    fn facet(&mut self, corners: &[[f32; 3]]) {
        let ids: Vec<u32> = corners.iter().map(|&p| self.vertex(p)).collect();
        triangulate_fan(&ids, &mut self.mesh.triangles);
    }

    fn close_group(&mut self, name: String, start: usize) {
        let end = self.mesh.triangles.len();
        if end > start {
            self.mesh.source_groups.push(SourceGroup {
                name,
                triangles: start..end,
            });
        } else {
            tracing::warn!("STL solid '{}' has no facets", name);
        }
    }
}

/// Parse STL bytes, choosing binary when the size matches the facet count.
///
/// With `dedup` off every facet corner becomes its own point.
pub(crate) fn parse_stl(bytes: &[u8], dedup: bool) -> Result<Mesh> {
    if is_binary(bytes) {
        parse_binary(bytes, dedup)
    } else {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| FormatIssue::Malformed("STL is neither valid binary nor ASCII".into()))?;
        parse_ascii(text, dedup)
    }
}

fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < BINARY_HEADER_LEN + 4 {
        return false;
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    count
        .checked_mul(BINARY_FACET_LEN)
        .and_then(|n| n.checked_add(BINARY_HEADER_LEN + 4))
        == Some(bytes.len())
}

fn binary_solid_name(header: &[u8]) -> String {
    let text: String = header
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    let name = text.trim().strip_prefix("solid").unwrap_or(text.trim()).trim();
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        name.to_string()
    } else {
        "solid_0".to_string()
    }
}

fn parse_binary(bytes: &[u8], dedup: bool) -> Result<Mesh> {
    let mut builder = MeshBuilder::new(dedup);
    let facets = &bytes[BINARY_HEADER_LEN + 4..];
    for facet in facets.chunks_exact(BINARY_FACET_LEN) {
        // 12 bytes normal, 3 x 12 bytes vertices, 2 bytes attribute
        let corners: Vec<[f32; 3]> = (0..3)
            .map(|v| {
                let base = 12 + v * 12;
                let coord = |i: usize| {
                    let o = base + i * 4;
                    f32::from_le_bytes([facet[o], facet[o + 1], facet[o + 2], facet[o + 3]])
                };
                [coord(0), coord(1), coord(2)]
            })
            .collect();
        builder.facet(&corners);
    }
    let name = binary_solid_name(&bytes[..BINARY_HEADER_LEN]);
    builder.close_group(name, 0);

    tracing::debug!(
        "Binary STL: {} facets, {} unique vertices",
        builder.mesh.triangles.len(),
        builder.mesh.points.len()
    );
    Ok(builder.mesh)
}

fn parse_ascii(text: &str, dedup: bool) -> Result<Mesh> {
    let mut builder = MeshBuilder::new(dedup);
    let mut solid: Option<(String, usize)> = None;
    let mut corners: Vec<[f32; 3]> = Vec::new();
    let mut in_loop = false;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let at = |msg: &str| FormatIssue::Malformed(format!("line {}: {msg}", line_no + 1));

        match keyword {
            "" => {}
            "solid" => {
                if solid.is_some() {
                    return Err(at("nested 'solid'"));
                }
                let name = rest.trim();
                let name = if name.is_empty() {
                    format!("solid_{}", builder.mesh.source_groups.len())
                } else {
                    name.to_string()
                };
                solid = Some((name, builder.open_group()));
            }
            "endsolid" => {
                let (name, start) = solid.take().ok_or_else(|| at("'endsolid' without 'solid'"))?;
                builder.close_group(name, start);
            }
            "facet" => {
                if solid.is_none() {
                    return Err(at("'facet' outside a solid"));
                }
            }
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" => {
                if !in_loop {
                    return Err(at("'vertex' outside a loop"));
                }
                let coords: Vec<f32> = rest
                    .split_whitespace()
                    .map(|t| t.parse::<f32>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|_| at("bad vertex coordinates"))?;
                if coords.len() != 3 {
                    return Err(at("vertex needs 3 coordinates"));
                }
                corners.push([coords[0], coords[1], coords[2]]);
            }
            "endloop" => {
                if corners.len() < 3 {
                    return Err(at("facet loop with fewer than 3 vertices"));
                }
                builder.facet(&corners);
                in_loop = false;
            }
            "endfacet" => {}
            other => return Err(at(&format!("unexpected keyword '{other}'"))),
        }
    }

    if solid.is_some() || in_loop {
        return Err(FormatIssue::Truncated("STL solid (missing 'endsolid')".into()));
    }

    tracing::debug!(
        "ASCII STL: {} solids, {} facets, {} unique vertices",
        builder.mesh.source_groups.len(),
        builder.mesh.triangles.len(),
        builder.mesh.points.len()
    );
    Ok(builder.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SOLIDS: &str = "\
solid wing_surface
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 1 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
endsolid wing_surface
solid
  facet normal 0 0 1
    outer loop
      vertex 5 5 5
      vertex 6 5 5
      vertex 6 6 5
    endloop
  endfacet
endsolid
";

    #[test]
    fn test_ascii_solids_and_dedup() {
        let mesh = parse_stl(TWO_SOLIDS.as_bytes(), true).unwrap();
        assert_eq!(mesh.points.len(), 7);
        assert_eq!(mesh.triangles.len(), 3);
        assert_eq!(mesh.triangles[1], [0, 2, 3]);
        assert_eq!(
            mesh.source_groups,
            vec![
                SourceGroup {
                    name: "wing_surface".into(),
                    triangles: 0..2
                },
                SourceGroup {
                    name: "solid_1".into(),
                    triangles: 2..3
                },
            ]
        );
    }

    #[test]
    fn test_solids_do_not_share_vertices() {
        let text = "\
solid a
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid a
solid b
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 0 0 1
    endloop
  endfacet
endsolid b
";
        let mesh = parse_stl(text.as_bytes(), true).unwrap();
        assert_eq!(mesh.points.len(), 6);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn test_dedup_disabled() {
        let mesh = parse_stl(TWO_SOLIDS.as_bytes(), false).unwrap();
        assert_eq!(mesh.points.len(), 9);
        assert_eq!(mesh.triangles[1], [3, 4, 5]);
        assert!(mesh.validate().is_ok());
    }

    fn binary_stl(header: &[u8], facets: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut bytes = vec![0u8; 80];
        bytes[..header.len()].copy_from_slice(header);
        bytes.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            bytes.extend_from_slice(&[0u8; 12]);
            for v in facet {
                for c in v {
                    bytes.extend_from_slice(&c.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&[0u8; 2]);
        }
        bytes
    }

    #[test]
    fn test_binary() {
        // Header starting with "solid" must not trigger ASCII parsing
        let bytes = binary_stl(
            b"solid exported",
            &[
                [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            ],
        );
        let mesh = parse_stl(&bytes, true).unwrap();
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [1, 3, 2]]);
        assert_eq!(mesh.source_groups[0].name, "exported");
    }

    #[test]
    fn test_binary_unnamed() {
        let bytes = binary_stl(&[0xff, 0x00], &[[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        let mesh = parse_stl(&bytes, true).unwrap();
        assert_eq!(mesh.source_groups[0].name, "solid_0");
    }

    #[test]
    fn test_missing_endsolid() {
        let text = "solid a\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\n";
        assert!(matches!(
            parse_stl(text.as_bytes(), true),
            Err(FormatIssue::Truncated(_))
        ));
    }

    #[test]
    fn test_bad_vertex() {
        let text = "solid a\nfacet normal 0 0 1\nouter loop\nvertex 0 zero 0\n";
        assert!(matches!(
            parse_stl(text.as_bytes(), true),
            Err(FormatIssue::Malformed(_))
        ));
    }
}
