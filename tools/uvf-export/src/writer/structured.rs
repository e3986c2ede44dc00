//! Grouped output: one buffer per member under `resources/uvf/`

use std::borrow::Cow;
use std::path::Path;

use uvf_common::{BufferSection, GeometryKind, ManifestNode, UVF_LAYOUT};

use super::{LabelSet, WriteOptions, encode_mesh, prepare_output, write_file, write_manifest};
use crate::classify::{classify_label, classify_mesh};
use crate::error::ConvertError;
use crate::mesh::Mesh;

/// Group used when no field or solid name matches a keyword.
pub const DEFAULT_GROUP_ID: &str = "default";
/// Single member of the default group.
pub const DEFAULT_MEMBER_ID: &str = "main";

/// One SolidGeometry + Face pair with its own buffer.
#[derive(Debug, Clone)]
pub struct Member<'a> {
    pub id: String,
    pub kind: GeometryKind,
    pub mesh: Cow<'a, Mesh>,
}

/// A GeometryGroup and the members it lists.
#[derive(Debug, Clone)]
pub struct MemberGroup<'a> {
    pub id: String,
    pub members: Vec<Member<'a>>,
}

impl<'a> MemberGroup<'a> {
    /// Bucket members into one group per kind, in slice, surface,
    /// isosurface, streamline order. Empty groups are omitted.
    pub fn by_kind(members: Vec<Member<'a>>) -> Vec<MemberGroup<'a>> {
        bucket_by_kind(members, |m| m.kind)
            .into_iter()
            .map(|(kind, members)| MemberGroup {
                id: kind.group_id().to_string(),
                members,
            })
            .collect()
    }
}

/// Split `items` by kind in [`GeometryKind::ALL`] order, dropping empty kinds.
pub(crate) fn bucket_by_kind<T>(
    items: Vec<T>,
    kind_of: impl Fn(&T) -> GeometryKind,
) -> Vec<(GeometryKind, Vec<T>)> {
    let mut buckets: Vec<(GeometryKind, Vec<T>)> =
        GeometryKind::ALL.iter().map(|&k| (k, Vec::new())).collect();
    for item in items {
        let kind = kind_of(&item);
        if let Some((_, bucket)) = buckets.iter_mut().find(|(k, _)| *k == kind) {
            bucket.push(item);
        }
    }
    buckets.retain(|(_, bucket)| !bucket.is_empty());
    buckets
}

/// A member whose buffer is already on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenMember {
    pub id: String,
    pub kind: GeometryKind,
    pub sections: Vec<BufferSection>,
    /// Index elements in the `indices` section
    pub index_count: u64,
}

impl WrittenMember {
    pub fn face_id(&self) -> String {
        format!("{}_face", self.id)
    }
}

/// A label set with every group id reserved.
pub fn member_labels() -> LabelSet {
    let mut labels = LabelSet::default();
    for kind in GeometryKind::ALL {
        labels.reserve(kind.group_id());
    }
    labels.reserve(DEFAULT_GROUP_ID);
    labels
}

/// Decide the groups and members for one parsed file.
///
/// Source groups (STL solids) become members holding only their own
/// triangles. Otherwise every point array whose name matches a keyword
/// becomes a member carrying the whole mesh. With no match, the mesh is
/// written as `default/main`.
pub fn plan_members(mesh: &Mesh) -> Vec<MemberGroup<'_>> {
    let mut labels = member_labels();

    let members: Vec<Member<'_>> = if mesh.source_groups.is_empty() {
        mesh.point_data
            .iter()
            .filter_map(|array| {
                GeometryKind::from_field_name(&array.name).map(|kind| Member {
                    id: labels.claim(&array.name),
                    kind,
                    mesh: Cow::Borrowed(mesh),
                })
            })
            .collect()
    } else {
        mesh.source_groups
            .iter()
            .map(|group| Member {
                id: labels.claim(&group.name),
                kind: classify_label(&group.name),
                mesh: Cow::Owned(mesh.extract_triangles(group.triangles.clone())),
            })
            .collect()
    };

    if members.is_empty() {
        return vec![MemberGroup {
            id: DEFAULT_GROUP_ID.to_string(),
            members: vec![Member {
                id: DEFAULT_MEMBER_ID.to_string(),
                kind: classify_mesh(mesh, DEFAULT_MEMBER_ID),
                mesh: Cow::Borrowed(mesh),
            }],
        }];
    }
    MemberGroup::by_kind(members)
}

/// Encode one member and write `resources/uvf/<id>.bin`.
pub(crate) fn write_member(member: &Member<'_>, output: &Path) -> Result<WrittenMember, ConvertError> {
    let (bytes, sections) = encode_mesh(&member.mesh);
    let index_count = sections.first().map_or(0, |s| s.element_count());
    write_file(&output.join(UVF_LAYOUT.member_buffer_path(&member.id)), &bytes)?;
    Ok(WrittenMember {
        id: member.id.clone(),
        kind: member.kind,
        sections,
        index_count,
    })
}

/// Manifest nodes for groups of written members, in the given order.
pub(crate) fn group_manifest(groups: &[(String, Vec<WrittenMember>)]) -> Vec<ManifestNode> {
    let mut nodes = vec![ManifestNode::root_group(
        groups.iter().map(|(id, _)| id.clone()).collect(),
    )];
    for (group_id, members) in groups {
        nodes.push(ManifestNode::group(
            group_id,
            members.iter().map(|m| m.id.clone()).collect(),
        ));
        for member in members {
            let face_id = member.face_id();
            nodes.push(ManifestNode::solid_geometry(
                &member.id,
                member.kind,
                &face_id,
                &UVF_LAYOUT.member_buffer_path(&member.id),
                member.sections.clone(),
            ));
            nodes.push(ManifestNode::face(
                &face_id,
                &member.id,
                member.kind,
                member.index_count,
            ));
        }
    }
    nodes
}

/// Write member buffers and the hierarchical manifest.
///
/// The output directory must already be prepared.
pub(crate) fn write_groups(groups: &[MemberGroup<'_>], output: &Path) -> Result<(), ConvertError> {
    let mut written = Vec::with_capacity(groups.len());
    for group in groups {
        let members = group
            .members
            .iter()
            .map(|member| write_member(member, output))
            .collect::<Result<Vec<_>, _>>()?;
        written.push((group.id.clone(), members));
    }
    write_manifest(output, &group_manifest(&written))
}

/// Write `mesh` grouped by field names or source groups.
///
/// Returns the number of groups written.
pub fn write_structured(
    mesh: &Mesh,
    output: &Path,
    options: WriteOptions,
) -> Result<usize, ConvertError> {
    prepare_output(output, options)?;
    let groups = plan_members(mesh);
    write_groups(&groups, output)?;

    tracing::info!(
        "Wrote structured UVF to {}: {} groups, {} members",
        output.display(),
        groups.len(),
        groups.iter().map(|g| g.members.len()).sum::<usize>()
    );
    Ok(groups.len())
}
