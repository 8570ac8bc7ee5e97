//! Folder listing for the file list panel.

use crate::error::{Error, Result};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the files directly inside `folder`, sorted by name.
///
/// Subdirectories and their contents are not included.
///
/// # Errors
///
/// Returns `Error::FolderRead` if the folder or one of its entries cannot be read.
pub fn list_folder_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::FolderRead {
            path: folder.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!("Listed {} files in {}", files.len(), folder.display());
    Ok(files)
}
