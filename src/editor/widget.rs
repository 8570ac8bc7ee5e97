//! Text editor widget
//!
//! This module implements the main text editor widget using egui's TextEdit
//! with a syntect layouter. Decorations that depend on the view settings
//! (current row highlight, whitespace markers, column rulers) are painted
//! from the laid out galley after the TextEdit has been shown.

use crate::config::Settings;
use crate::state::Document;
use crate::syntax::HighlightCache;
use eframe::egui::text::{CCursor, CCursorRange};
use eframe::egui::text_edit::TextEditState;
use eframe::egui::{
    self, Align2, Color32, FontFamily, FontId, Galley, Pos2, Rect, ScrollArea, Shape, Stroke,
    TextEdit, Ui,
};
use log::debug;
use std::sync::Arc;

/// Font names offered in the Font menu.
pub const FONT_CHOICES: &[&str] = &["Monospace", "Proportional"];

/// Columns at which rulers are drawn.
pub const RULER_COLUMNS: &[usize] = &[80, 120];

const SPACE_MARKER: &str = "·";
const TAB_MARKER: &str = "→";
const EOL_MARKER: &str = "¶";

/// Map a persisted font name to a registered egui family.
///
/// Only the built-in families exist in the font atlas, so any other name
/// (or none) falls back to monospace.
pub fn resolve_font_family(name: Option<&str>) -> FontFamily {
    match name.map(str::trim) {
        Some(n) if n.eq_ignore_ascii_case("proportional") => FontFamily::Proportional,
        Some(n) if n.eq_ignore_ascii_case("monospace") || n.is_empty() => FontFamily::Monospace,
        None => FontFamily::Monospace,
        Some(other) => {
            debug!("Font '{}' is not registered, using monospace", other);
            FontFamily::Monospace
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Options
// ─────────────────────────────────────────────────────────────────────────────

/// View settings that affect how the editor is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorOptions {
    pub row_highlight: bool,
    pub show_spaces: bool,
    pub show_tabs: bool,
    pub show_end_of_line: bool,
    pub show_column_rulers: bool,
}

impl EditorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            row_highlight: settings.row_highlight_enabled,
            show_spaces: settings.show_spaces,
            show_tabs: settings.show_tabs,
            show_end_of_line: settings.show_end_of_line,
            show_column_rulers: settings.show_column_rulers,
        }
    }

    fn shows_markers(&self) -> bool {
        self.show_spaces || self.show_tabs || self.show_end_of_line
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Widget
// ─────────────────────────────────────────────────────────────────────────────

/// Result of showing the editor widget.
pub struct EditorOutput {
    /// Whether the content was modified.
    pub changed: bool,
}

/// A syntax highlighting editor bound to a [`Document`].
///
/// # Example
///
/// ```ignore
/// EditorWidget::new(&mut state.document, &mut self.highlight_cache)
///     .language(Some("Rust"))
///     .font_family(FontFamily::Monospace)
///     .options(EditorOptions::from_settings(&state.settings))
///     .show(ui);
/// ```
pub struct EditorWidget<'a> {
    document: &'a mut Document,
    cache: &'a mut HighlightCache,
    language: Option<&'a str>,
    font_size: f32,
    font_family: FontFamily,
    options: EditorOptions,
    dark_mode: bool,
    id: Option<egui::Id>,
}

impl<'a> EditorWidget<'a> {
    pub fn new(document: &'a mut Document, cache: &'a mut HighlightCache) -> Self {
        Self {
            document,
            cache,
            language: None,
            font_size: 14.0,
            font_family: FontFamily::Monospace,
            options: EditorOptions::default(),
            dark_mode: true,
            id: None,
        }
    }

    /// Set the syntect grammar name used for highlighting.
    #[must_use]
    pub fn language(mut self, language: Option<&'a str>) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    #[must_use]
    pub fn options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    /// Pick the dark or light highlighting theme.
    #[must_use]
    pub fn dark_mode(mut self, dark: bool) -> Self {
        self.dark_mode = dark;
        self
    }

    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        let Self {
            document,
            cache,
            language,
            font_size,
            font_family,
            options,
            dark_mode,
            id,
        } = self;

        let base_id = id.unwrap_or_else(|| ui.id().with("editor"));
        let (id, scroll_id) = editor_ids(base_id, document.content_version());

        let pending = document.take_pending_selection();
        if let Some((start, end)) = pending {
            let mut state = TextEditState::load(ui.ctx(), id).unwrap_or_default();
            state.cursor.set_char_range(Some(CCursorRange::two(
                CCursor::new(start),
                CCursor::new(end),
            )));
            state.store(ui.ctx(), id);
        }

        let original_content = document.content.clone();
        let font_id = FontId::new(font_size, font_family);

        let layout_font = font_id.clone();
        let mut layouter = move |ui: &Ui, text: &str, _wrap_width: f32| -> Arc<Galley> {
            let mut job = cache.layout_job(
                text,
                language,
                &layout_font,
                dark_mode,
                ui.visuals().text_color(),
            );
            job.wrap.max_width = f32::INFINITY;
            ui.fonts(|f| f.layout_job(job))
        };

        let scroll_output = ScrollArea::both()
            .id_source(scroll_id)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                // Placeholder so decorations end up behind the text
                let background = ui.painter().add(Shape::Noop);

                let text_output = TextEdit::multiline(&mut document.content)
                    .id(id)
                    .frame(false)
                    .font(font_id.clone())
                    .lock_focus(true)
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .layouter(&mut layouter)
                    .show(ui);

                if pending.is_some() {
                    text_output.response.request_focus();
                }

                let caret = text_output
                    .cursor_range
                    .map(|range| range.primary.ccursor.index)
                    .unwrap_or(document.cursor_index);
                let galley = &text_output.galley;
                let origin = text_output.galley_pos;
                let clip = ui.clip_rect();

                let mut shapes = Vec::new();
                if options.row_highlight {
                    shapes.extend(row_highlight(galley, origin, clip, caret, dark_mode));
                }
                if options.show_column_rulers {
                    let glyph_width = ui.fonts(|f| f.glyph_width(&font_id, ' '));
                    let color = ui.visuals().weak_text_color().gamma_multiply(0.4);
                    for &column in RULER_COLUMNS {
                        let x = origin.x + glyph_width * column as f32;
                        shapes.push(Shape::line_segment(
                            [Pos2::new(x, clip.top()), Pos2::new(x, clip.bottom())],
                            Stroke::new(1.0, color),
                        ));
                    }
                }
                ui.painter().set(background, Shape::Vec(shapes));

                if options.shows_markers() {
                    paint_markers(ui, galley, origin, &font_id, options);
                }

                text_output
            });

        let text_output = scroll_output.inner;

        let changed = document.content != original_content;
        if changed {
            // TextEdit edits the string in place
            document.record_edit(original_content);
        }

        if let Some(cursor_range) = text_output.cursor_range {
            document.set_cursor(
                cursor_range.primary.ccursor.index,
                cursor_range.secondary.ccursor.index,
            );
        }

        EditorOutput { changed }
    }
}

/// Ids for the TextEdit and its ScrollArea.
///
/// The TextEdit id includes `content_version` so undo/redo re-read the
/// content; the scroll id does not, so the scroll position survives them.
fn editor_ids(base_id: egui::Id, content_version: u64) -> (egui::Id, egui::Id) {
    (base_id.with(content_version), base_id.with("scroll"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Decorations
// ─────────────────────────────────────────────────────────────────────────────

fn row_highlight(
    galley: &Galley,
    origin: Pos2,
    clip: Rect,
    caret: usize,
    dark_mode: bool,
) -> Option<Shape> {
    let rcursor = galley.from_ccursor(CCursor::new(caret)).rcursor;
    let row = galley.rows.get(rcursor.row)?;

    let rect = Rect::from_min_max(
        Pos2::new(clip.left(), origin.y + row.min_y()),
        Pos2::new(clip.right(), origin.y + row.max_y()),
    );
    let color = if dark_mode {
        Color32::from_rgba_unmultiplied(255, 255, 255, 14)
    } else {
        Color32::from_rgba_unmultiplied(0, 0, 0, 14)
    };
    Some(Shape::rect_filled(rect, 0.0, color))
}

/// Draw space, tab and end of line markers for the visible rows.
fn paint_markers(ui: &Ui, galley: &Galley, origin: Pos2, font_id: &FontId, options: EditorOptions) {
    let painter = ui.painter();
    let clip = ui.clip_rect();
    let color = ui.visuals().weak_text_color();
    let marker_font = FontId::new(font_id.size * 0.8, font_id.family.clone());

    for row in &galley.rows {
        let top = origin.y + row.min_y();
        let bottom = origin.y + row.max_y();
        if bottom < clip.top() || top > clip.bottom() {
            continue;
        }
        let center_y = (top + bottom) / 2.0;

        for (column, glyph) in row.glyphs.iter().enumerate() {
            let marker = match glyph.chr {
                ' ' if options.show_spaces => SPACE_MARKER,
                '\t' if options.show_tabs => TAB_MARKER,
                _ => continue,
            };
            let x = origin.x + (row.x_offset(column) + row.x_offset(column + 1)) / 2.0;
            painter.text(
                Pos2::new(x, center_y),
                Align2::CENTER_CENTER,
                marker,
                marker_font.clone(),
                color,
            );
        }

        if options.show_end_of_line && row.ends_with_newline {
            painter.text(
                Pos2::new(origin.x + row.rect.right() + 2.0, center_y),
                Align2::LEFT_CENTER,
                EOL_MARKER,
                marker_font.clone(),
                color,
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
