//! Application state management
//!
//! This module defines the central `AppState` struct that owns the open
//! document, the folder shown in the file list, and the live `Settings`.
//! Every settings-affecting action goes through `AppState`, which writes the
//! full settings document back to disk right away.

use crate::config::{Settings, SettingsStore, StatusBarRow, Theme, ViewToggle};
use crate::error::{Error, Result, ResultExt};
use crate::files::{list_folder_files, read_text_file, write_text_file};
use crate::syntax::{get_highlighter, language_label, DetectedLanguage};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Maximum number of snapshots kept in the undo history.
const MAX_UNDO_SIZE: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// The text shown in the editor together with its editing history.
#[derive(Debug, Clone)]
pub struct Document {
    /// File path (None until opened from or saved to disk)
    pub path: Option<PathBuf>,
    /// Document content
    pub content: String,
    /// Content as last read from or written to disk
    original_content: String,
    /// Caret as (line, column), both 0-indexed
    pub cursor_position: (usize, usize),
    /// Caret as a character index into `content`
    pub cursor_index: usize,
    /// Selected character range (start, end), None without a selection
    pub selection: Option<(usize, usize)>,
    /// Selection the editor widget should adopt on its next frame
    pending_selection: Option<(usize, usize)>,
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
    /// Incremented when content is replaced from outside the widget
    content_version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty, untitled document.
    pub fn new() -> Self {
        Self {
            path: None,
            content: String::new(),
            original_content: String::new(),
            cursor_position: (0, 0),
            cursor_index: 0,
            selection: None,
            pending_selection: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            content_version: 0,
        }
    }

    /// Create a document for a file that was just read from disk.
    pub fn with_file(path: PathBuf, content: String) -> Self {
        Self {
            path: Some(path),
            original_content: content.clone(),
            content,
            ..Self::new()
        }
    }

    pub fn is_modified(&self) -> bool {
        self.content != self.original_content
    }

    /// File name for display, or "Untitled".
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.is_modified() {
            format!("{}*", name)
        } else {
            name
        }
    }

    pub fn mark_saved(&mut self) {
        self.original_content = self.content.clone();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the content, recording the previous content for undo.
    pub fn set_content(&mut self, new_content: String) {
        if new_content != self.content {
            let old = std::mem::replace(&mut self.content, new_content);
            self.push_undo(old);
            self.redo_stack.clear();
        }
    }

    /// Record an edit the widget already applied to `content`.
    ///
    /// Pass the content as it was before the edit.
    pub fn record_edit(&mut self, old_content: String) {
        if old_content != self.content {
            self.push_undo(old_content);
            self.redo_stack.clear();
        }
    }

    fn push_undo(&mut self, snapshot: String) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > MAX_UNDO_SIZE {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last edit. Returns `true` if anything changed.
    pub fn undo(&mut self) -> bool {
        if let Some(previous) = self.undo_stack.pop() {
            let current = std::mem::replace(&mut self.content, previous);
            self.redo_stack.push(current);
            self.after_external_change();
            true
        } else {
            false
        }
    }

    /// Redo the last undone edit. Returns `true` if anything changed.
    pub fn redo(&mut self) -> bool {
        if let Some(next) = self.redo_stack.pop() {
            let current = std::mem::replace(&mut self.content, next);
            self.undo_stack.push(current);
            self.after_external_change();
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Changes whenever the widget must re-read `content` from scratch.
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// Keep the caret where it was (clamped) and hand it to the fresh widget.
    fn after_external_change(&mut self) {
        self.content_version = self.content_version.wrapping_add(1);
        let caret = self.cursor_index.min(self.content.chars().count());
        self.request_selection(caret, caret);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection and clipboard edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Update caret and selection from the widget's cursor range.
    pub fn set_cursor(&mut self, primary: usize, secondary: usize) {
        self.cursor_index = primary;
        self.cursor_position = char_index_to_line_col(&self.content, primary);
        self.selection = if primary == secondary {
            None
        } else {
            Some((primary.min(secondary), primary.max(secondary)))
        };
    }

    /// Ask the widget to select `[start, end)` on its next frame.
    pub fn request_selection(&mut self, start: usize, end: usize) {
        self.pending_selection = Some((start, end));
        self.set_cursor(end, start);
    }

    /// Take the selection requested with [`Document::request_selection`].
    pub fn take_pending_selection(&mut self) -> Option<(usize, usize)> {
        self.pending_selection.take()
    }

    pub fn select_all(&mut self) {
        let len = self.content.chars().count();
        self.request_selection(0, len);
    }

    /// The currently selected text, if any.
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection?;
        let (start, end) = (
            char_to_byte(&self.content, start),
            char_to_byte(&self.content, end),
        );
        Some(self.content[start..end].to_string())
    }

    /// Replace the selection (or insert at the caret) with `text`.
    pub fn replace_selection(&mut self, text: &str) {
        let (start, end) = self
            .selection
            .unwrap_or((self.cursor_index, self.cursor_index));
        let byte_start = char_to_byte(&self.content, start);
        let byte_end = char_to_byte(&self.content, end);

        let mut new_content = String::with_capacity(self.content.len() + text.len());
        new_content.push_str(&self.content[..byte_start]);
        new_content.push_str(text);
        new_content.push_str(&self.content[byte_end..]);
        self.set_content(new_content);

        let caret = start + text.chars().count();
        self.request_selection(caret, caret);
    }

    /// Remove the selection and return its text.
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.selected_text()?;
        self.replace_selection("");
        Some(text)
    }

    /// Empty the document. The previous content stays in the undo history.
    pub fn clear(&mut self) {
        self.set_content(String::new());
        self.request_selection(0, 0);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the editor window shows, independent of how it is drawn.
pub struct AppState {
    /// Live settings; the only source of truth between load and save
    pub settings: Settings,
    store: SettingsStore,
    pub document: Document,
    folder: Option<PathBuf>,
    folder_entries: Vec<PathBuf>,
    /// Index into the folder entries highlighted in the file list
    pub selected_entry: Option<usize>,
    language: Option<DetectedLanguage>,
    /// File list on the left of the editor instead of the right (session only)
    pub list_on_left: bool,
    status_message: Option<String>,
}

impl AppState {
    /// Create the state for `store`: create the settings file if needed, load
    /// it and reopen the last used folder and file.
    ///
    /// Persistence failures are reported in the status bar and never abort.
    pub fn new(store: SettingsStore) -> Self {
        let mut status_message = None;

        if let Err(e) = store.ensure_exists() {
            warn!("Could not create settings file: {}", e);
            status_message = Some(e.to_string());
        }

        let settings = store.load_or_default(|e| status_message = Some(e.to_string()));

        let mut state = Self::with_settings(store, settings);
        state.status_message = status_message;
        state.restore_session();
        state
    }

    /// Create the state from already loaded settings, without touching disk.
    pub fn with_settings(store: SettingsStore, settings: Settings) -> Self {
        Self {
            settings,
            store,
            document: Document::new(),
            folder: None,
            folder_entries: Vec::new(),
            selected_entry: None,
            language: None,
            list_on_left: false,
            status_message: None,
        }
    }

    fn restore_session(&mut self) {
        if let Some(folder) = self.settings.last_used_folder.clone() {
            if folder.is_dir() {
                self.load_folder(folder)
                    .unwrap_or_warn_default((), "Could not restore last folder");
            } else {
                debug!("Last used folder {} no longer exists", folder.display());
            }
        }

        if let Some(file) = self.settings.last_used_file.clone() {
            if file.is_file() {
                self.load_file(file)
                    .unwrap_or_warn_default((), "Could not restore last file");
            } else {
                debug!("Last used file {} no longer exists", file.display());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Write the full settings document. Failures are reported, not returned.
    ///
    /// Returns `true` if the settings were saved.
    pub fn persist_settings(&mut self) -> bool {
        match self.store.save(&self.settings) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                self.show_error(e.to_string());
                false
            }
        }
    }

    /// Mutate the settings and save them immediately.
    pub fn update_settings<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.persist_settings()
    }

    /// Flip a view option and save. Returns the new value.
    pub fn toggle_view(&mut self, toggle: ViewToggle) -> bool {
        let enabled = self.settings.toggle(toggle);
        info!("{} set to {}", toggle.label(), enabled);
        self.persist_settings();
        enabled
    }

    pub fn set_theme(&mut self, theme: Theme) {
        info!("Theme changed to: {:?}", theme);
        self.update_settings(|s| s.theme = theme);
    }

    pub fn set_status_bar_row(&mut self, row: StatusBarRow) {
        self.update_settings(|s| s.status_bar_row = row);
    }

    pub fn set_font_family(&mut self, font_family: Option<String>) {
        self.update_settings(|s| s.font_family = font_family);
    }

    /// Move the file list to the other side of the editor.
    pub fn swap_list_side(&mut self) {
        self.list_on_left = !self.list_on_left;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Files and Folders
    // ─────────────────────────────────────────────────────────────────────────

    fn load_file(&mut self, path: PathBuf) -> Result<()> {
        let content = read_text_file(&path)?;
        self.language = get_highlighter().detect_language(&path);
        info!(
            "Opened {} ({})",
            path.display(),
            language_label(self.language.as_ref())
        );
        self.document = Document::with_file(path, content);
        Ok(())
    }

    fn load_folder(&mut self, folder: PathBuf) -> Result<()> {
        self.folder_entries = list_folder_files(&folder)?;
        self.selected_entry = None;
        self.folder = Some(folder);
        Ok(())
    }

    /// Open a file in the editor and remember it as the last used file.
    pub fn open_file(&mut self, path: PathBuf) -> Result<()> {
        self.load_file(path.clone())?;
        self.update_settings(|s| s.last_used_file = Some(path));
        Ok(())
    }

    /// List a folder in the file list and remember it as the last used folder.
    pub fn open_folder(&mut self, folder: PathBuf) -> Result<()> {
        self.load_folder(folder.clone())?;
        info!(
            "Opened folder {} ({} files)",
            folder.display(),
            self.folder_entries.len()
        );
        self.update_settings(|s| s.last_used_folder = Some(folder));
        Ok(())
    }

    /// Re-read the current folder's file list.
    pub fn refresh_folder(&mut self) -> Result<()> {
        if let Some(folder) = self.folder.clone() {
            let selected = self
                .selected_entry
                .and_then(|i| self.folder_entries.get(i))
                .cloned();
            self.load_folder(folder)?;
            self.selected_entry =
                selected.and_then(|path| self.folder_entries.iter().position(|p| *p == path));
        }
        Ok(())
    }

    /// Open the entry selected in the file list.
    ///
    /// Returns `false` if nothing is selected.
    pub fn load_selected(&mut self) -> Result<bool> {
        let Some(path) = self
            .selected_entry
            .and_then(|i| self.folder_entries.get(i))
            .cloned()
        else {
            debug!("Load requested without a selected entry");
            return Ok(false);
        };
        self.open_file(path)?;
        Ok(true)
    }

    /// Write the document to its path.
    ///
    /// Returns `false` if the document has no path yet; use
    /// [`AppState::save_document_as`] then.
    pub fn save_document(&mut self) -> Result<bool> {
        let Some(path) = self.document.path.clone() else {
            return Ok(false);
        };
        write_text_file(&path, &self.document.content)?;
        self.document.mark_saved();
        Ok(true)
    }

    /// Write the document to a new path and make it the current file.
    pub fn save_document_as(&mut self, path: PathBuf) -> Result<()> {
        write_text_file(&path, &self.document.content)?;
        self.document.path = Some(path.clone());
        self.document.mark_saved();
        self.language = get_highlighter().detect_language(&path);

        let in_listed_folder = self
            .folder
            .as_deref()
            .is_some_and(|folder| path.parent() == Some(folder));
        if in_listed_folder {
            self.refresh_folder()?;
        }

        self.update_settings(|s| s.last_used_file = Some(path));
        Ok(())
    }

    /// Clear the editor and the file list and forget both last used paths.
    pub fn close_file_and_folder(&mut self) {
        self.document = Document::new();
        self.folder = None;
        self.folder_entries.clear();
        self.selected_entry = None;
        self.language = None;
        self.update_settings(|s| {
            s.last_used_file = None;
            s.last_used_folder = None;
        });
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn folder_entries(&self) -> &[PathBuf] {
        &self.folder_entries
    }

    pub fn language(&self) -> Option<&DetectedLanguage> {
        self.language.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status Bar
    // ─────────────────────────────────────────────────────────────────────────

    pub fn file_label(&self) -> String {
        format!(
            "Currently Selected File: {}",
            self.document
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    }

    pub fn folder_label(&self) -> String {
        format!(
            "Currently Selected Folder: {}",
            self.folder
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    }

    pub fn language_label(&self) -> String {
        language_label(self.language.as_ref())
    }

    /// Caret position, 1-based.
    pub fn caret_label(&self) -> String {
        let (line, column) = self.document.cursor_position;
        format!("Line: {}, Column: {}", line + 1, column + 1)
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Report a failed operation in the status bar.
    pub fn report(&mut self, context: &str, error: &Error) {
        warn!("{}: {}", context, error);
        self.show_error(format!("{}: {}", context, error));
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character index to (line, column), both 0-indexed.
pub fn char_index_to_line_col(text: &str, char_index: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;

    for (i, ch) in text.chars().enumerate() {
        if i >= char_index {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert a character index to a byte offset, clamped to the text length.
pub fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SETTINGS_FILE_NAME;
    use std::fs;
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> AppState {
        AppState::new(SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME)))
    }

    fn reload_settings(dir: &TempDir) -> Settings {
        SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME))
            .load()
            .unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_document_undo_redo() {
        let mut doc = Document::new();
        doc.set_content("a".to_string());
        doc.set_content("ab".to_string());

        assert!(doc.undo());
        assert_eq!(doc.content, "a");
        assert!(doc.undo());
        assert_eq!(doc.content, "");
        assert!(!doc.undo());

        assert!(doc.redo());
        assert_eq!(doc.content, "a");
        assert!(doc.can_redo());
        assert_eq!(doc.content_version(), 3);
    }

    #[test]
    fn test_undo_updates_caret_position() {
        let mut doc = Document::new();
        doc.set_content("one".to_string());
        doc.set_content("one\ntwo\nthree".to_string());
        doc.set_cursor(10, 10);
        assert_eq!(doc.cursor_position, (2, 2));

        assert!(doc.undo());
        assert_eq!(doc.content, "one");
        assert_eq!(doc.cursor_index, 3);
        assert_eq!(doc.cursor_position, (0, 3));
        assert_eq!(doc.take_pending_selection(), Some((3, 3)));

        doc.set_cursor(1, 1);
        assert!(doc.redo());
        assert_eq!(doc.cursor_position, (0, 1));
    }

    #[test]
    fn test_undo_clamps_caret_to_shorter_content() {
        let mut doc = Document::new();
        doc.set_content("ab".to_string());
        doc.set_content("ab\ncdef".to_string());
        doc.set_cursor(7, 7);
        assert_eq!(doc.cursor_position, (1, 4));

        assert!(doc.undo());
        assert_eq!(doc.cursor_index, 2);
        assert_eq!(doc.cursor_position, (0, 2));
        assert!(doc.selection.is_none());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut doc = Document::new();
        doc.set_content("one".to_string());
        doc.undo();
        assert!(doc.can_redo());

        let old = doc.content.clone();
        doc.content.push('x');
        doc.record_edit(old);
        assert!(!doc.can_redo());
        assert!(doc.can_undo());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut doc = Document::new();
        for i in 0..(MAX_UNDO_SIZE + 10) {
            doc.set_content(i.to_string());
        }
        let mut undone = 0;
        while doc.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_SIZE);
    }

    #[test]
    fn test_selection_and_cut() {
        let mut doc = Document::with_file(PathBuf::from("a.txt"), "héllo world".to_string());
        doc.set_cursor(5, 0);
        assert_eq!(doc.cursor_position, (0, 5));
        assert_eq!(doc.selected_text().as_deref(), Some("héllo"));

        assert_eq!(doc.cut_selection().as_deref(), Some("héllo"));
        assert_eq!(doc.content, " world");
        assert_eq!(doc.take_pending_selection(), Some((0, 0)));
        assert!(doc.is_modified());
        assert!(doc.undo());
        assert_eq!(doc.content, "héllo world");
    }

    #[test]
    fn test_paste_at_caret_and_over_selection() {
        let mut doc = Document::new();
        doc.set_content("ab".to_string());
        doc.set_cursor(1, 1);
        doc.replace_selection("XY");
        assert_eq!(doc.content, "aXYb");
        assert_eq!(doc.cursor_index, 3);

        doc.set_cursor(0, 4);
        doc.replace_selection("z");
        assert_eq!(doc.content, "z");
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut doc = Document::new();
        doc.set_content("line 1\nline 2".to_string());
        doc.select_all();
        assert_eq!(doc.take_pending_selection(), Some((0, 13)));
        assert_eq!(doc.selected_text().as_deref(), Some("line 1\nline 2"));

        doc.clear();
        assert!(doc.content.is_empty());
        assert!(doc.undo());
        assert_eq!(doc.content, "line 1\nline 2");
    }

    #[test]
    fn test_no_selection_means_no_cut() {
        let mut doc = Document::new();
        doc.set_content("abc".to_string());
        doc.set_cursor(1, 1);
        assert!(doc.cut_selection().is_none());
        assert_eq!(doc.content, "abc");
    }

    #[test]
    fn test_title() {
        let mut doc = Document::with_file(PathBuf::from("/x/main.rs"), "fn".to_string());
        assert_eq!(doc.title(), "main.rs");
        doc.content.push('!');
        assert_eq!(doc.title(), "main.rs*");
        assert_eq!(Document::new().title(), "Untitled");
    }

    #[test]
    fn test_char_index_to_line_col() {
        let text = "Hello\nWorld\n!";
        assert_eq!(char_index_to_line_col(text, 0), (0, 0));
        assert_eq!(char_index_to_line_col(text, 6), (1, 0));
        assert_eq!(char_index_to_line_col(text, 12), (2, 0));
        assert_eq!(char_index_to_line_col("", 3), (0, 0));
    }

    #[test]
    fn test_char_to_byte() {
        assert_eq!(char_to_byte("héllo", 2), 3);
        assert_eq!(char_to_byte("abc", 10), 3);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AppState
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_first_launch_creates_settings() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        assert!(state.store().path().exists());
        assert_eq!(state.settings, Settings::default());
        assert!(state.status_message().is_none());
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "not json").unwrap();

        let state = test_state(&dir);
        assert_eq!(state.settings, Settings::default());
        assert!(state.status_message().is_some());
    }

    #[test]
    fn test_toggle_is_saved_immediately() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);

        assert!(state.toggle_view(ViewToggle::GridLines));
        let saved = reload_settings(&dir);
        assert!(saved.grid_lines_visible);
        assert!(saved.row_highlight_enabled);

        state.set_theme(Theme::Dark);
        state.set_status_bar_row(StatusBarRow::Top);
        state.set_font_family(Some("Proportional".to_string()));
        let saved = reload_settings(&dir);
        assert_eq!(saved, state.settings);
    }

    #[test]
    fn test_unwritable_settings_keep_editor_usable() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("missing").join(SETTINGS_FILE_NAME));

        let mut state = AppState::new(store);
        assert!(state.status_message().is_some());

        state.clear_status();
        assert!(state.toggle_view(ViewToggle::ShowTabs));
        assert!(state.settings.show_tabs);
        assert!(state.status_message().is_some());
    }

    #[test]
    fn test_open_file_records_last_used_and_language() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("main.rs");
        fs::write(&file, "fn main() {}\n").unwrap();

        let mut state = test_state(&dir);
        state.open_file(file.clone()).unwrap();

        assert_eq!(state.document.content, "fn main() {}\n");
        assert_eq!(state.language_label(), "Detected Language: RUST");
        assert_eq!(reload_settings(&dir).last_used_file, Some(file.clone()));
        assert!(state.file_label().ends_with(&file.display().to_string()));
    }

    // Linux filesystems accept arbitrary bytes in names; macOS does not
    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_does_not_break_saving() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join(OsStr::from_bytes(b"caf\xe9.rs"));
        fs::write(&file, "fn main() {}\n").unwrap();

        let mut state = test_state(&dir);
        state.open_file(file).unwrap();
        assert!(state.status_message().is_none());

        assert!(state.toggle_view(ViewToggle::GridLines));
        assert!(state.status_message().is_none());

        let saved = reload_settings(&dir);
        assert!(saved.grid_lines_visible);
        assert_eq!(saved.last_used_file, Some(dir.path().join("caf\u{FFFD}.rs")));
    }

    #[test]
    fn test_open_missing_file_leaves_state_alone() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);
        state.document.set_content("keep".to_string());

        let result = state.open_file(dir.path().join("nope.rs"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
        assert_eq!(state.document.content, "keep");
        assert!(state.settings.last_used_file.is_none());
    }

    #[test]
    fn test_open_folder_and_load_selected() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("a.py"), "print(1)\n").unwrap();
        fs::write(project.join("b.txt"), "notes").unwrap();

        let mut state = test_state(&dir);
        state.open_folder(project.clone()).unwrap();
        assert_eq!(state.folder_entries().len(), 2);
        assert_eq!(reload_settings(&dir).last_used_folder, Some(project.clone()));

        assert!(!state.load_selected().unwrap());

        state.selected_entry = Some(1);
        assert!(state.load_selected().unwrap());
        assert_eq!(state.document.content, "notes");
        assert_eq!(state.document.path, Some(project.join("b.txt")));
    }

    #[test]
    fn test_save_document() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "old").unwrap();

        let mut state = test_state(&dir);
        assert!(!state.save_document().unwrap());

        state.open_file(file.clone()).unwrap();
        state.document.set_content("new".to_string());
        assert!(state.document.is_modified());
        assert!(state.save_document().unwrap());
        assert!(!state.document.is_modified());
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
    }

    #[test]
    fn test_save_as_refreshes_listed_folder() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();

        let mut state = test_state(&dir);
        state.open_folder(project.clone()).unwrap();
        assert!(state.folder_entries().is_empty());

        state.document.set_content("print('hi')".to_string());
        state.save_document_as(project.join("hi.py")).unwrap();

        assert_eq!(state.folder_entries(), &[project.join("hi.py")]);
        assert!(state.language().is_some());
        assert_eq!(
            reload_settings(&dir).last_used_file,
            Some(project.join("hi.py"))
        );
    }

    #[test]
    fn test_close_file_and_folder_forgets_paths() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let mut state = test_state(&dir);
        state.open_folder(dir.path().to_path_buf()).unwrap();
        state.open_file(file).unwrap();

        state.close_file_and_folder();
        assert!(state.document.content.is_empty());
        assert!(state.folder().is_none());
        assert!(state.folder_entries().is_empty());
        assert_eq!(state.folder_label(), "Currently Selected Folder: ");

        let saved = reload_settings(&dir);
        assert!(saved.last_used_file.is_none());
        assert!(saved.last_used_folder.is_none());
    }

    #[test]
    fn test_relaunch_restores_session_and_toggles() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("lib.rs");
        fs::write(&file, "pub fn f() {}").unwrap();

        {
            let mut state = test_state(&dir);
            state.open_folder(dir.path().to_path_buf()).unwrap();
            state.open_file(file.clone()).unwrap();
            state.toggle_view(ViewToggle::GridLines);
            state.toggle_view(ViewToggle::ListView);
        }

        let state = test_state(&dir);
        assert!(state.settings.grid_lines_visible);
        assert!(!state.settings.list_view_visible);
        assert_eq!(state.document.path, Some(file));
        assert_eq!(state.document.content, "pub fn f() {}");
        assert_eq!(state.folder(), Some(dir.path()));
        assert_eq!(state.language_label(), "Detected Language: RUST");
    }

    #[test]
    fn test_caret_label_is_one_based() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);
        state.document.set_content("ab\ncd".to_string());
        state.document.set_cursor(4, 4);
        assert_eq!(state.caret_label(), "Line: 2, Column: 2");

        assert!(state.document.undo());
        assert_eq!(state.caret_label(), "Line: 1, Column: 1");
    }

    #[test]
    fn test_swap_list_side_is_not_persisted() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);
        let before = fs::read_to_string(state.store().path()).unwrap();

        state.swap_list_side();
        assert!(state.list_on_left);
        assert_eq!(fs::read_to_string(state.store().path()).unwrap(), before);
    }
}
