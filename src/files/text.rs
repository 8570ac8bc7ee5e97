//! Reading and writing editor documents.

use crate::error::{Error, Result};
use log::info;
use std::fs;
use std::path::Path;

/// Read a whole file as UTF-8 text.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replace the contents of `path` with `content`.
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!("Saved {} ({} bytes)", path.display(), content.len());
    Ok(())
}
