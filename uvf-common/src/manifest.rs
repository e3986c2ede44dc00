//! UVF manifest (`manifest.json`) model.
//!
//! A manifest is a flat JSON array of nodes. Nodes reference each other by
//! id to form the hierarchy:
//!
//! ```text
//! root_group (GeometryGroup)
//! └── members: GeometryGroup or SolidGeometry ids
//!     SolidGeometry ── faces/edges: Face ids, resources: buffer file
//!     Face ── packedParentId: SolidGeometry id, bufferLocations: index range
//! ```

use serde::{Deserialize, Serialize};

use crate::buffers::BufferSection;
use crate::format::{DEFAULT_FACE_COLOR, IDENTITY_TRANSFORM, ROOT_GROUP_ID};
use crate::kind::GeometryKind;

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    GeometryGroup,
    SolidGeometry,
    Face,
}

/// One entry of the manifest array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub properties: NodeProperties,
    #[serde(default)]
    pub attributions: Attributions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperties {
    /// Group type (always 0 for geometry groups)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geom_kind: Option<GeometryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_locations: Option<BufferLocations>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packed_parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub buffers: BufferResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferResource {
    /// Buffer file path relative to the manifest
    pub path: String,
    pub sections: Vec<BufferSection>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferLocations {
    pub indices: Vec<IndexRange>,
}

/// Range of index elements (not triangles) in a buffer, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRange {
    pub buf_num: u32,
    pub start_index: u64,
    pub end_index: u64,
}

impl ManifestNode {
    /// The top-level group listing `members`.
    pub fn root_group(members: Vec<String>) -> Self {
        Self {
            id: ROOT_GROUP_ID.to_string(),
            kind: NodeKind::GeometryGroup,
            properties: NodeProperties {
                group_type: Some(0),
                transform: Some(IDENTITY_TRANSFORM.to_vec()),
                ..Default::default()
            },
            attributions: Attributions {
                members: Some(members),
                ..Default::default()
            },
            resources: None,
        }
    }

    /// An intermediate group listing `members`.
    pub fn group(id: &str, members: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::GeometryGroup,
            properties: NodeProperties {
                group_type: Some(0),
                ..Default::default()
            },
            attributions: Attributions {
                members: Some(members),
                ..Default::default()
            },
            resources: None,
        }
    }

    /// A solid geometry owning one buffer file.
    ///
    /// Streamline geometry lists its face under `edges`, everything else
    /// under `faces`.
    pub fn solid_geometry(
        id: &str,
        kind: GeometryKind,
        face_id: &str,
        buffer_path: &str,
        sections: Vec<BufferSection>,
    ) -> Self {
        Self::solid_geometry_with_faces(
            id,
            kind,
            vec![face_id.to_string()],
            buffer_path,
            sections,
        )
    }

    /// A solid whose buffer is drawn by several faces.
    pub fn solid_geometry_with_faces(
        id: &str,
        kind: GeometryKind,
        face_ids: Vec<String>,
        buffer_path: &str,
        sections: Vec<BufferSection>,
    ) -> Self {
        let (edges, faces) = if kind == GeometryKind::Streamline {
            (face_ids, Vec::new())
        } else {
            (Vec::new(), face_ids)
        };
        Self {
            id: id.to_string(),
            kind: NodeKind::SolidGeometry,
            properties: NodeProperties {
                geom_kind: Some(kind),
                ..Default::default()
            },
            attributions: Attributions {
                edges: Some(edges),
                faces: Some(faces),
                vertices: Some(Vec::new()),
                ..Default::default()
            },
            resources: Some(Resources {
                buffers: BufferResource {
                    path: buffer_path.to_string(),
                    sections,
                    kind: "buffers".to_string(),
                },
            }),
        }
    }

    /// A face drawing `index_count` index elements of its parent's buffer.
    pub fn face(id: &str, parent_id: &str, kind: GeometryKind, index_count: u64) -> Self {
        Self::face_range(id, parent_id, kind, 0, index_count)
    }

    /// A face drawing index elements `start..end` of its parent's buffer.
    pub fn face_range(id: &str, parent_id: &str, kind: GeometryKind, start: u64, end: u64) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::Face,
            properties: NodeProperties {
                geom_kind: Some(kind),
                alpha: Some(1.0),
                color: Some(DEFAULT_FACE_COLOR),
                buffer_locations: Some(BufferLocations {
                    indices: vec![IndexRange {
                        buf_num: 0,
                        start_index: start,
                        end_index: end,
                    }],
                }),
                ..Default::default()
            },
            attributions: Attributions {
                packed_parent_id: Some(parent_id.to_string()),
                ..Default::default()
            },
            resources: None,
        }
    }

    /// Ids this node points at (members, faces, edges, vertices, parent).
    pub fn references(&self) -> impl Iterator<Item = &str> {
        let a = &self.attributions;
        [&a.members, &a.edges, &a.faces, &a.vertices]
            .into_iter()
            .flatten()
            .flatten()
            .map(String::as_str)
            .chain(a.packed_parent_id.as_deref())
    }
}

/// Serialize a manifest to its on-disk JSON text.
pub fn to_json(nodes: &[ManifestNode]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(nodes)
}

/// Parse manifest JSON text.
pub fn from_json(json: &str) -> serde_json::Result<Vec<ManifestNode>> {
    serde_json::from_str(json)
}
