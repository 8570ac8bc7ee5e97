//! Native file dialog integration using the rfd crate
//!
//! The shell asks a [`FileDialogProvider`] for paths and records whatever it
//! returns verbatim. [`NativeDialogs`] is the rfd-backed implementation.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// Source of user-chosen file and folder paths.
pub trait FileDialogProvider {
    /// Pick a single file to open. `None` if cancelled.
    fn pick_file(&self, initial_dir: Option<&Path>) -> Option<PathBuf>;

    /// Pick a folder to list in the file panel. `None` if cancelled.
    fn pick_folder(&self, initial_dir: Option<&Path>) -> Option<PathBuf>;

    /// Choose where to save a document that has no path yet. `None` if cancelled.
    fn save_file(&self, initial_dir: Option<&Path>, default_name: Option<&str>) -> Option<PathBuf>;
}

/// Blocking native dialogs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

impl FileDialogProvider for NativeDialogs {
    fn pick_file(&self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Open File")
            .add_filter("All Files", &["*"]);

        if let Some(dir) = initial_dir {
            dialog = dialog.set_directory(dir);
        }

        dialog.pick_file()
    }

    fn pick_folder(&self, initial_dir: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = FileDialog::new().set_title("Open Folder");

        if let Some(dir) = initial_dir {
            dialog = dialog.set_directory(dir);
        }

        dialog.pick_folder()
    }

    fn save_file(&self, initial_dir: Option<&Path>, default_name: Option<&str>) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Save File")
            .add_filter("All Files", &["*"]);

        if let Some(dir) = initial_dir {
            dialog = dialog.set_directory(dir);
        }

        if let Some(name) = default_name {
            dialog = dialog.set_file_name(name);
        }

        dialog.save_file()
    }
}
