//! Directory helpers for batch conversion

use std::io;
use std::path::{Path, PathBuf};

use uvf_common::UVF_LAYOUT;
use walkdir::WalkDir;

use crate::error::ConvertError;

/// True only for an existing directory (symlinks followed).
pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Batch inputs directly inside `dir`, sorted by file name.
///
/// Only regular files whose extension is `vtk` or `vtp` (any case) count;
/// subdirectories are not searched.
pub fn matching_files(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    if !dir.exists() {
        return Err(ConvertError::read(dir, io::Error::from(io::ErrorKind::NotFound)));
    }
    if !dir.is_dir() {
        return Err(ConvertError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ConvertError::read(dir, io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| UVF_LAYOUT.is_batch_input(ext));
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Number of batch inputs directly inside `dir`.
pub fn count_matching_files(dir: &Path) -> Result<usize, ConvertError> {
    matching_files(dir).map(|files| files.len())
}
