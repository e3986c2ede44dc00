//! Directory batch conversion
//!
//! Every `.vtk`/`.vtp` file directly inside the input directory becomes one
//! member of a single structured output. Files are parsed on the rayon pool
//! one chunk at a time and each member buffer is written as soon as its file
//! is parsed, so only a chunk of meshes is held in memory. A file that fails
//! is reported and left out; the rest are still written.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::classify::classify_label;
use crate::error::ConvertError;
use crate::paths::matching_files;
use crate::reader::read_mesh;
use crate::status::{BatchReport, FileFailure, OperationKind, Statistics};
use crate::writer::structured::{bucket_by_kind, group_manifest, member_labels, write_member};
use crate::writer::{Member, WriteOptions, prepare_output, write_manifest};

/// Member label for each file: the stem, or `stem_ext` when the stem is
/// already taken.
fn assign_labels(files: &[PathBuf]) -> Vec<String> {
    let mut labels = member_labels();
    files
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase())
                .unwrap_or_default();
            labels.claim_with_suffix(&stem, &ext)
        })
        .collect()
}

/// Convert every matching file in `input` into one UVF directory.
///
/// Returns `Err` only when nothing could be attempted (missing or empty
/// directory, existing output). Per-file failures land in
/// [`BatchReport::failures`].
pub fn convert_directory(
    input: &Path,
    output: &Path,
    options: WriteOptions,
) -> Result<BatchReport, ConvertError> {
    let files = matching_files(input)?;
    if files.is_empty() {
        return Err(ConvertError::NoMatchingFiles(input.to_path_buf()));
    }
    prepare_output(output, options)?;

    tracing::info!(
        "Converting {} files from {}",
        files.len(),
        input.display()
    );

    let labels = assign_labels(&files);
    let chunk_size = rayon::current_num_threads().max(1);

    let mut stats = Statistics::empty(OperationKind::Directory);
    stats.files = files.len();
    let mut failures = Vec::new();
    let mut written = Vec::new();

    for (paths, chunk_labels) in files.chunks(chunk_size).zip(labels.chunks(chunk_size)) {
        let results: Vec<_> = paths.par_iter().map(|path| read_mesh(path)).collect();
        for ((path, label), result) in paths.iter().zip(chunk_labels).zip(results) {
            match result {
                Ok(mesh) => {
                    stats.points += mesh.point_count();
                    stats.triangles += mesh.triangle_count();
                    tracing::info!("  {} -> {}", path.display(), label);
                    let member = Member {
                        id: label.clone(),
                        kind: classify_label(label),
                        mesh: Cow::Owned(mesh),
                    };
                    written.push(write_member(&member, output)?);
                }
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    failures.push(FileFailure {
                        path: path.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }

    if !written.is_empty() {
        // Groups are listed alphabetically, members in file order
        let mut groups: Vec<_> = bucket_by_kind(written, |m| m.kind)
            .into_iter()
            .map(|(kind, members)| (kind.group_id().to_string(), members))
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        stats.groups = groups.len();
        write_manifest(output, &group_manifest(&groups))?;
    }

    tracing::info!(
        "Directory conversion finished: {} of {} files, {} groups",
        stats.files - failures.len(),
        stats.files,
        stats.groups
    );

    Ok(BatchReport { stats, failures })
}
