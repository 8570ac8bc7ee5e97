//! Main application module
//!
//! This module implements the eframe App trait for the editor window: the
//! menu bar, the file list panel, the status bar and the editor itself.
//! UI code only collects `AppAction`s; they are applied after rendering so
//! the state is never borrowed by two panels at once.

use crate::config::{StatusBarRow, Theme, ViewToggle};
use crate::editor::{resolve_font_family, EditorOptions, EditorWidget, FONT_CHOICES};
use crate::error::{Error, Result};
use crate::files::dialogs::{FileDialogProvider, NativeDialogs};
use crate::state::AppState;
use crate::syntax::HighlightCache;
use crate::theme::ThemeManager;
use eframe::egui::{self, Color32, Id, Key, LayerId, Modifiers, Order, Rect, Stroke};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Window title prefix.
pub const APP_NAME: &str = "CynVee Code Editor";

/// User actions collected during rendering and applied afterwards.
#[derive(Debug, Clone, PartialEq)]
enum AppAction {
    OpenFile,
    OpenFolder,
    LoadSelected,
    Save,
    CloseFileAndFolder,
    Exit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Clear,
    Toggle(ViewToggle),
    SetTheme(Theme),
    SetStatusBarRow(StatusBarRow),
    SetFont(Option<String>),
    SwapListSide,
    DismissStatus,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct CynVeeApp {
    state: AppState,
    theme_manager: ThemeManager,
    highlight_cache: HighlightCache,
    dialogs: Box<dyn FileDialogProvider>,
    /// Created on first use; not every session touches the clipboard
    clipboard: Option<arboard::Clipboard>,
    /// OS dark mode as last reported by eframe
    system_dark: Option<bool>,
    last_title: String,
    should_exit: bool,
}

impl CynVeeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        info!("Initializing {}", APP_NAME);

        let system_dark = cc
            .integration_info
            .system_theme
            .map(|theme| theme == eframe::Theme::Dark);

        let mut theme_manager = ThemeManager::new(state.settings.theme);
        theme_manager.apply(&cc.egui_ctx, system_dark);
        info!("Applied initial theme: {:?}", state.settings.theme);

        Self {
            state,
            theme_manager,
            highlight_cache: HighlightCache::new(),
            dialogs: Box::new(NativeDialogs),
            clipboard: None,
            system_dark,
            last_title: String::new(),
            should_exit: false,
        }
    }

    fn window_title(&self) -> String {
        format!("{} - {}", APP_NAME, self.state.document.title())
    }

    /// Directory dialogs should start in.
    fn dialog_dir(&self) -> Option<PathBuf> {
        self.state
            .document
            .path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| self.state.folder().map(Path::to_path_buf))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn render_ui(&mut self, ctx: &egui::Context) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let mut cells: Vec<Rect> = Vec::new();

        let menu = egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| self.render_menus(ui, &mut actions));
        });
        cells.push(menu.response.rect);

        if self.state.settings.status_bar_visible {
            let panel = match self.state.settings.status_bar_row {
                StatusBarRow::Top => egui::TopBottomPanel::top("status_bar"),
                StatusBarRow::Bottom => egui::TopBottomPanel::bottom("status_bar"),
            };
            let status = panel.show(ctx, |ui| self.render_status_bar(ui, &mut actions));
            cells.push(status.response.rect);
        }

        if self.state.settings.list_view_visible {
            let panel = if self.state.list_on_left {
                egui::SidePanel::left("file_list")
            } else {
                egui::SidePanel::right("file_list")
            };
            let list = panel
                .resizable(true)
                .default_width(220.0)
                .show(ctx, |ui| self.render_file_list(ui, &mut actions));
            cells.push(list.response.rect);
        }

        let dark_mode = ctx.style().visuals.dark_mode;
        let central = egui::CentralPanel::default().show(ctx, |ui| {
            let options = EditorOptions::from_settings(&self.state.settings);
            let font_family = resolve_font_family(self.state.settings.font_family.as_deref());
            let language = self.state.language().map(|l| l.name.clone());

            let output = EditorWidget::new(&mut self.state.document, &mut self.highlight_cache)
                .language(language.as_deref())
                .font_family(font_family)
                .options(options)
                .dark_mode(dark_mode)
                .id(Id::new("main_editor"))
                .show(ui);
            if output.changed {
                debug!("Editor content changed, recorded for undo");
            }
        });
        cells.push(central.response.rect);

        if self.state.settings.grid_lines_visible {
            paint_grid_lines(ctx, &cells);
        }

        actions
    }

    fn render_menus(&self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        let settings = &self.state.settings;

        ui.menu_button("File", |ui| {
            if ui
                .add(egui::Button::new("Open File...").shortcut_text("Ctrl+O"))
                .clicked()
            {
                actions.push(AppAction::OpenFile);
                ui.close_menu();
            }
            if ui
                .add(egui::Button::new("Open Folder...").shortcut_text("Ctrl+Shift+O"))
                .clicked()
            {
                actions.push(AppAction::OpenFolder);
                ui.close_menu();
            }
            if ui
                .add(egui::Button::new("Save").shortcut_text("Ctrl+S"))
                .clicked()
            {
                actions.push(AppAction::Save);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Close File & Folder").clicked() {
                actions.push(AppAction::CloseFileAndFolder);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Exit").clicked() {
                actions.push(AppAction::Exit);
                ui.close_menu();
            }
        });

        ui.menu_button("Edit", |ui| {
            let document = &self.state.document;
            let has_selection = document.selection.is_some();

            let edit_items = [
                ("Undo", "Ctrl+Z", AppAction::Undo, document.can_undo()),
                ("Redo", "Ctrl+Y", AppAction::Redo, document.can_redo()),
                ("Cut", "", AppAction::Cut, has_selection),
                ("Copy", "", AppAction::Copy, has_selection),
                ("Paste", "", AppAction::Paste, true),
                ("Select All", "", AppAction::SelectAll, true),
                ("Clear", "", AppAction::Clear, !document.content.is_empty()),
            ];
            for (index, (label, shortcut, action, enabled)) in edit_items.into_iter().enumerate() {
                if index == 2 || index == 5 {
                    ui.separator();
                }
                let button = egui::Button::new(label).shortcut_text(shortcut);
                if ui.add_enabled(enabled, button).clicked() {
                    actions.push(action);
                    ui.close_menu();
                }
            }
        });

        ui.menu_button("View", |ui| {
            for &toggle in ViewToggle::editor_options() {
                menu_toggle(ui, settings.is_enabled(toggle), toggle, actions);
            }
            ui.separator();
            menu_toggle(
                ui,
                settings.list_view_visible,
                ViewToggle::ListView,
                actions,
            );
            if ui
                .add_enabled(
                    settings.list_view_visible,
                    egui::Button::new("Move File List to Other Side"),
                )
                .clicked()
            {
                actions.push(AppAction::SwapListSide);
                ui.close_menu();
            }
            ui.separator();
            menu_toggle(
                ui,
                settings.status_bar_visible,
                ViewToggle::StatusBar,
                actions,
            );
            ui.menu_button("Status Bar Position", |ui| {
                for row in [StatusBarRow::Top, StatusBarRow::Bottom] {
                    if ui
                        .radio(settings.status_bar_row == row, row.label())
                        .clicked()
                    {
                        actions.push(AppAction::SetStatusBarRow(row));
                        ui.close_menu();
                    }
                }
            });
        });

        ui.menu_button("Theme", |ui| {
            for &theme in Theme::all() {
                if ui
                    .radio(self.theme_manager.current_theme() == theme, theme.label())
                    .clicked()
                {
                    actions.push(AppAction::SetTheme(theme));
                    ui.close_menu();
                }
            }
        });

        ui.menu_button("Font", |ui| {
            let current = resolve_font_family(settings.font_family.as_deref());
            for &name in FONT_CHOICES {
                let selected = resolve_font_family(Some(name)) == current;
                if ui.radio(selected, name).clicked() {
                    actions.push(AppAction::SetFont(Some(name.to_string())));
                    ui.close_menu();
                }
            }
        });

        ui.menu_button("Debug", |ui| {
            menu_toggle(
                ui,
                settings.grid_lines_visible,
                ViewToggle::GridLines,
                actions,
            );
        });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        ui.horizontal_wrapped(|ui| {
            ui.label(self.state.file_label());
            ui.separator();
            ui.label(self.state.folder_label());
            ui.separator();
            ui.label(self.state.language_label());
            ui.separator();
            ui.label(self.state.caret_label());

            if let Some(message) = self.state.status_message() {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, message);
                if ui.small_button("✕").clicked() {
                    actions.push(AppAction::DismissStatus);
                }
            }
        });
    }

    fn render_file_list(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        ui.horizontal(|ui| {
            let has_selection = self.state.selected_entry.is_some();
            if ui.add_enabled(has_selection, egui::Button::new("Load")).clicked() {
                actions.push(AppAction::LoadSelected);
            }
            if ui.button("Save").clicked() {
                actions.push(AppAction::Save);
            }
        });
        ui.separator();

        if self.state.folder().is_none() {
            ui.weak("No folder open");
            return;
        }

        let entries: Vec<(usize, String)> = self
            .state
            .folder_entries()
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (i, name)
            })
            .collect();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, name) in entries {
                    let selected = self.state.selected_entry == Some(index);
                    let response = ui.selectable_label(selected, name);
                    if response.clicked() {
                        self.state.selected_entry = Some(index);
                    }
                    if response.double_clicked() {
                        self.state.selected_entry = Some(index);
                        actions.push(AppAction::LoadSelected);
                    }
                }
            });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Action Handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_action(&mut self, action: AppAction) {
        debug!("Handling action: {:?}", action);
        match action {
            AppAction::OpenFile => self.handle_open_file(),
            AppAction::OpenFolder => self.handle_open_folder(),
            AppAction::LoadSelected => {
                if let Err(e) = self.state.load_selected() {
                    self.state.report("Failed to load file", &e);
                }
            }
            AppAction::Save => self.handle_save_file(),
            AppAction::CloseFileAndFolder => {
                info!("Closing file and folder");
                self.state.close_file_and_folder();
                self.highlight_cache.clear();
            }
            AppAction::Exit => self.should_exit = true,
            AppAction::Undo => {
                if !self.state.document.undo() {
                    debug!("Undo requested but stack is empty");
                }
            }
            AppAction::Redo => {
                if !self.state.document.redo() {
                    debug!("Redo requested but stack is empty");
                }
            }
            AppAction::Cut => self.handle_cut(),
            AppAction::Copy => self.handle_copy(),
            AppAction::Paste => self.handle_paste(),
            AppAction::SelectAll => self.state.document.select_all(),
            AppAction::Clear => self.state.document.clear(),
            AppAction::Toggle(toggle) => {
                self.state.toggle_view(toggle);
            }
            AppAction::SetTheme(theme) => {
                self.state.set_theme(theme);
                self.theme_manager.set_theme(theme);
            }
            AppAction::SetStatusBarRow(row) => self.state.set_status_bar_row(row),
            AppAction::SetFont(font) => self.state.set_font_family(font),
            AppAction::SwapListSide => self.state.swap_list_side(),
            AppAction::DismissStatus => self.state.clear_status(),
        }
    }

    fn handle_open_file(&mut self) {
        let Some(path) = self.dialogs.pick_file(self.dialog_dir().as_deref()) else {
            debug!("File dialog cancelled");
            return;
        };
        info!("Opening file: {}", path.display());
        if let Err(e) = self.state.open_file(path) {
            self.state.report("Failed to open file", &e);
        }
    }

    fn handle_open_folder(&mut self) {
        let initial = self.state.folder().map(Path::to_path_buf);
        let Some(folder) = self.dialogs.pick_folder(initial.as_deref()) else {
            debug!("Folder dialog cancelled");
            return;
        };
        info!("Opening folder: {}", folder.display());
        if let Err(e) = self.state.open_folder(folder) {
            self.state.report("Failed to open folder", &e);
        }
    }

    /// Save to the document's path, asking for one if it has none.
    fn handle_save_file(&mut self) {
        match self.state.save_document() {
            Ok(true) => debug!("File saved successfully"),
            Ok(false) => {
                let dir = self.dialog_dir();
                let Some(path) = self.dialogs.save_file(dir.as_deref(), Some("Untitled.txt"))
                else {
                    debug!("Save dialog cancelled");
                    return;
                };
                if let Err(e) = self.state.save_document_as(path) {
                    self.state.report("Failed to save file", &e);
                }
            }
            Err(e) => self.state.report("Failed to save file", &e),
        }
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new()?);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| Error::Clipboard("clipboard unavailable".to_string()))
    }

    fn copy_to_clipboard(&mut self, text: String) -> Result<()> {
        self.clipboard()?.set_text(text)?;
        Ok(())
    }

    fn handle_copy(&mut self) {
        if let Some(text) = self.state.document.selected_text() {
            if let Err(e) = self.copy_to_clipboard(text) {
                self.state.report("Copy failed", &e);
            }
        }
    }

    fn handle_cut(&mut self) {
        let Some(text) = self.state.document.selected_text() else {
            return;
        };
        match self.copy_to_clipboard(text) {
            Ok(()) => {
                self.state.document.cut_selection();
            }
            Err(e) => self.state.report("Cut failed", &e),
        }
    }

    fn handle_paste(&mut self) {
        let text = self.clipboard().and_then(|c| c.get_text().map_err(Error::from));
        match text {
            Ok(text) => self.state.document.replace_selection(&text),
            Err(e) => self.state.report("Paste failed", &e),
        }
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) -> Vec<AppAction> {
        let shortcuts = [
            (Modifiers::COMMAND | Modifiers::SHIFT, Key::O, AppAction::OpenFolder),
            (Modifiers::COMMAND, Key::O, AppAction::OpenFile),
            (Modifiers::COMMAND, Key::S, AppAction::Save),
            (Modifiers::COMMAND | Modifiers::SHIFT, Key::Z, AppAction::Redo),
            (Modifiers::COMMAND, Key::Z, AppAction::Undo),
            (Modifiers::COMMAND, Key::Y, AppAction::Redo),
        ];

        // Consumed before the editor runs so TextEdit's own undo never sees them
        ctx.input_mut(|i| {
            shortcuts
                .into_iter()
                .filter(|(modifiers, key, _)| i.consume_key(*modifiers, *key))
                .map(|(_, _, action)| action)
                .collect()
        })
    }
}

impl eframe::App for CynVeeApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let system_dark = frame
            .info()
            .system_theme
            .map(|theme| theme == eframe::Theme::Dark);
        if system_dark.is_some() {
            self.system_dark = system_dark;
        }
        self.theme_manager.apply_if_needed(ctx, self.system_dark);

        let title = self.window_title();
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }

        let mut actions = self.handle_keyboard_shortcuts(ctx);
        actions.extend(self.render_ui(ctx));
        for action in actions {
            self.handle_action(action);
        }

        if self.should_exit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        if !self.state.store().save_silent(&self.state.settings) {
            warn!("Settings were not saved on exit");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

fn menu_toggle(ui: &mut egui::Ui, enabled: bool, toggle: ViewToggle, actions: &mut Vec<AppAction>) {
    let mut checked = enabled;
    if ui.checkbox(&mut checked, toggle.label()).clicked() {
        actions.push(AppAction::Toggle(toggle));
        ui.close_menu();
    }
}

/// Outline every layout cell, for checking panel placement.
fn paint_grid_lines(ctx: &egui::Context, cells: &[Rect]) {
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("grid_lines")));
    let stroke = Stroke::new(1.0, Color32::from_rgb(255, 0, 255));
    for rect in cells {
        painter.rect_stroke(rect.shrink(0.5), 0.0, stroke);
    }
}
