//! UVF output writers
//!
//! Output directories hold `manifest.json` plus little-endian buffer files.
//! [`basic`] writes one flat buffer; [`structured`] writes one buffer per
//! member under `resources/uvf/`.

pub mod basic;
pub mod structured;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use hashbrown::HashSet;
use uvf_common::{BufferBuilder, BufferSection, ManifestNode, ROOT_GROUP_ID, UVF_LAYOUT};

use crate::error::ConvertError;
use crate::mesh::Mesh;

pub use structured::{Member, MemberGroup, WrittenMember};

/// Options shared by every writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Replace a previous conversion in the output directory
    pub force: bool,
}

/// Make `output` ready for a new conversion.
///
/// An existing `manifest.json` marks a previous conversion: it is an error
/// unless `force` is set, in which case the previous manifest and buffers
/// are removed. Unrelated files are left alone.
pub(crate) fn prepare_output(output: &Path, options: WriteOptions) -> Result<(), ConvertError> {
    let manifest = output.join(UVF_LAYOUT.manifest_file);
    if manifest.exists() {
        if !options.force {
            return Err(ConvertError::OutputExists(output.to_path_buf()));
        }
        tracing::info!("Overwriting previous conversion in {}", output.display());
        remove_file_if_exists(&manifest)?;
        remove_file_if_exists(&output.join(UVF_LAYOUT.basic_buffer_file))?;
        let resources = output.join(UVF_LAYOUT.resources_dir);
        if resources.is_dir() {
            fs::remove_dir_all(&resources).map_err(|e| ConvertError::write(&resources, e))?;
        }
    }
    fs::create_dir_all(output).map_err(|e| ConvertError::write(output, e))
}

fn remove_file_if_exists(path: &Path) -> Result<(), ConvertError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConvertError::write(path, e)),
    }
}

/// Write `bytes` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConvertError::write(parent, e))?;
    }
    let file = File::create(path).map_err(|e| ConvertError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| ConvertError::write(path, e))
}

pub(crate) fn write_manifest(output: &Path, nodes: &[ManifestNode]) -> Result<(), ConvertError> {
    let json = uvf_common::manifest::to_json(nodes)?;
    write_file(&output.join(UVF_LAYOUT.manifest_file), json.as_bytes())
}

/// Section names reserved for geometry.
const GEOMETRY_SECTIONS: [&str; 2] = ["indices", "position"];

/// Pack a mesh as `indices`, `position`, then one section per point array.
pub(crate) fn encode_mesh(mesh: &Mesh) -> (Vec<u8>, Vec<BufferSection>) {
    let mut builder = BufferBuilder::new();
    builder
        .push_u32("indices", 1, &mesh.index_buffer())
        .push_f32("position", 3, mesh.flat_positions(), false);
    for array in &mesh.point_data {
        let name = if GEOMETRY_SECTIONS.contains(&array.name.as_str()) {
            format!("{}_data", array.name)
        } else {
            array.name.clone()
        };
        builder.push_f32(&name, array.components, &array.values, true);
    }
    builder.finish()
}

/// Hands out manifest ids that are unique and safe to use as file names.
#[derive(Debug)]
pub struct LabelSet {
    taken: HashSet<String>,
}

impl Default for LabelSet {
    fn default() -> Self {
        let mut taken = HashSet::new();
        taken.insert(ROOT_GROUP_ID.to_string());
        Self { taken }
    }
}

impl LabelSet {
    /// Reserve an id that must not be handed out (group ids).
    pub fn reserve(&mut self, id: &str) {
        self.taken.insert(id.to_string());
    }

    /// Claim `base` (sanitized), or `base_2`, `base_3`, ... when taken.
    pub fn claim(&mut self, base: &str) -> String {
        let base = sanitize_label(base);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Claim `base`, falling back to `base_<suffix>` before numbering.
    pub fn claim_with_suffix(&mut self, base: &str, suffix: &str) -> String {
        let clean = sanitize_label(base);
        if !self.taken.contains(&clean) {
            return self.claim(&clean);
        }
        self.claim(&format!("{clean}_{suffix}"))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
