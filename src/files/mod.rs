//! File operations module
//!
//! Native file dialogs, folder listing for the file list panel, and reading
//! and writing the documents shown in the editor.

pub mod dialogs;
mod folder;
mod text;

pub use folder::list_folder_files;
pub use text::{read_text_file, write_text_file};
