//! Manifest inspection: counts, hierarchy rendering and reference checks

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::{HashMap, HashSet};
use uvf_common::manifest::from_json;
use uvf_common::{ManifestNode, NodeKind, ROOT_GROUP_ID, UVF_LAYOUT};

use crate::error::ConvertError;

/// Load `manifest.json` from a file path or an output directory.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestNode>, ConvertError> {
    let file: PathBuf = if path.is_dir() {
        path.join(UVF_LAYOUT.manifest_file)
    } else {
        path.to_path_buf()
    };
    let json = fs::read_to_string(&file).map_err(|e| ConvertError::read(&file, e))?;
    Ok(from_json(&json)?)
}

/// Node counts and buffer totals of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub nodes: usize,
    pub geometry_groups: usize,
    pub solid_geometries: usize,
    pub faces: usize,
    /// Index triplets over all `indices` sections
    pub triangles: u64,
    /// Positions over all `position` sections
    pub vertices: u64,
    /// Buffer files referenced, sorted
    pub buffer_files: BTreeSet<String>,
    /// Point-data section names per SolidGeometry
    pub fields: Vec<(String, Vec<String>)>,
}

impl ManifestSummary {
    pub fn from_nodes(nodes: &[ManifestNode]) -> Self {
        let mut summary = ManifestSummary {
            nodes: nodes.len(),
            ..Default::default()
        };
        for node in nodes {
            match node.kind {
                NodeKind::GeometryGroup => summary.geometry_groups += 1,
                NodeKind::Face => summary.faces += 1,
                NodeKind::SolidGeometry => {
                    summary.solid_geometries += 1;
                    let Some(resources) = &node.resources else {
                        continue;
                    };
                    let buffers = &resources.buffers;
                    summary.buffer_files.insert(buffers.path.clone());
                    let mut fields = Vec::new();
                    for section in &buffers.sections {
                        match section.name.as_str() {
                            "indices" => summary.triangles += section.element_count() / 3,
                            "position" => summary.vertices += section.element_count() / 3,
                            name => fields.push(name.to_string()),
                        }
                    }
                    if !fields.is_empty() {
                        summary.fields.push((node.id.clone(), fields));
                    }
                }
            }
        }
        summary
    }
}

fn children(node: &ManifestNode) -> impl Iterator<Item = &String> {
    let a = &node.attributions;
    [&a.members, &a.faces, &a.edges]
        .into_iter()
        .flatten()
        .flatten()
}

/// Indented hierarchy starting at `root_group`.
pub fn render_tree(nodes: &[ManifestNode]) -> String {
    let by_id: HashMap<&str, &ManifestNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut out = String::new();
    let mut visited = HashSet::new();
    match by_id.get(ROOT_GROUP_ID) {
        Some(&root) => render_node(root, &by_id, 0, &mut visited, &mut out),
        None => out.push_str("(no root_group)\n"),
    }
    out
}

fn render_node<'a>(
    node: &'a ManifestNode,
    by_id: &HashMap<&str, &'a ManifestNode>,
    depth: usize,
    visited: &mut HashSet<&'a str>,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    let kind = match node.kind {
        NodeKind::GeometryGroup => "GeometryGroup",
        NodeKind::SolidGeometry => "SolidGeometry",
        NodeKind::Face => "Face",
    };
    let _ = write!(out, "{indent}{} [{kind}]", node.id);
    if let Some(geom_kind) = node.properties.geom_kind {
        let _ = write!(out, " {geom_kind}");
    }
    if let Some(locations) = &node.properties.buffer_locations {
        let count: u64 = locations
            .indices
            .iter()
            .map(|r| r.end_index.saturating_sub(r.start_index))
            .sum();
        let _ = write!(out, " ({} triangles)", count / 3);
    }
    out.push('\n');

    if !visited.insert(node.id.as_str()) {
        return;
    }
    for child in children(node) {
        match by_id.get(child.as_str()) {
            Some(&child) => render_node(child, by_id, depth + 1, visited, out),
            None => {
                let _ = writeln!(out, "{indent}  {child} [missing]");
            }
        }
    }
}

/// `(node id, referenced id)` pairs whose target does not exist.
pub fn dangling_references(nodes: &[ManifestNode]) -> Vec<(String, String)> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    nodes
        .iter()
        .flat_map(|node| {
            node.references()
                .filter(|r| !ids.contains(r))
                .map(|r| (node.id.clone(), r.to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvf_common::{BufferBuilder, GeometryKind};

    fn sample() -> Vec<ManifestNode> {
        let mut builder = BufferBuilder::new();
        builder
            .push_u32("indices", 1, &[0, 1, 2, 0, 2, 3])
            .push_f32("position", 3, &[0.0; 12], false)
            .push_f32("pressure", 1, &[1.0; 4], true);
        let (_, sections) = builder.finish();
        vec![
            ManifestNode::root_group(vec!["surfaces".into()]),
            ManifestNode::group("surfaces", vec!["wing".into()]),
            ManifestNode::solid_geometry(
                "wing",
                GeometryKind::Surface,
                "wing_face",
                "resources/uvf/wing.bin",
                sections,
            ),
            ManifestNode::face("wing_face", "wing", GeometryKind::Surface, 6),
        ]
    }

    #[test]
    fn test_summary() {
        let summary = ManifestSummary::from_nodes(&sample());
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.geometry_groups, 2);
        assert_eq!(summary.solid_geometries, 1);
        assert_eq!(summary.faces, 1);
        assert_eq!(summary.triangles, 2);
        assert_eq!(summary.vertices, 4);
        assert!(summary.buffer_files.contains("resources/uvf/wing.bin"));
        assert_eq!(summary.fields, vec![("wing".to_string(), vec!["pressure".to_string()])]);
    }

    #[test]
    fn test_render_tree() {
        let tree = render_tree(&sample());
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], "root_group [GeometryGroup]");
        assert_eq!(lines[1], "  surfaces [GeometryGroup]");
        assert_eq!(lines[2], "    wing [SolidGeometry] surface");
        assert_eq!(lines[3], "      wing_face [Face] surface (2 triangles)");
    }

    #[test]
    fn test_dangling_references() {
        let mut nodes = sample();
        assert!(dangling_references(&nodes).is_empty());
        nodes.remove(3);
        assert_eq!(
            dangling_references(&nodes),
            vec![("wing".to_string(), "wing_face".to_string())]
        );
        assert!(render_tree(&nodes).contains("wing_face [missing]"));
    }
}
