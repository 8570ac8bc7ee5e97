//! Language detection and syntax highlighting
//!
//! This module integrates syntect as the grammar registry: the language of
//! the open document is chosen from its file extension, and the document is
//! laid out as a highlighted egui `LayoutJob`.
//!
//! # Example
//! ```ignore
//! let language = get_highlighter().detect_language(Path::new("main.rs"));
//! assert_eq!(language.map(|l| l.label()), Some("Detected Language: RUST".into()));
//! ```

use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId, Stroke};
use log::{debug, warn};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Syntect theme used with dark visuals
pub const DARK_THEME: &str = "base16-ocean.dark";

/// Syntect theme used with light visuals
pub const LIGHT_THEME: &str = "InspiredGitHub";

/// Status bar text when the extension maps to no known grammar
pub const UNSUPPORTED_LABEL: &str = "Detected Language Not Supported";

// ─────────────────────────────────────────────────────────────────────────────
// Detected Language
// ─────────────────────────────────────────────────────────────────────────────

/// A grammar found for the open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedLanguage {
    /// Syntect syntax name, e.g. "Rust" or "Plain Text"
    pub name: String,
}

impl DetectedLanguage {
    /// Status bar text for this language.
    pub fn label(&self) -> String {
        format!("Detected Language: {}", self.name.to_uppercase())
    }
}

/// Status bar text for an optional detection result.
pub fn language_label(language: Option<&DetectedLanguage>) -> String {
    language
        .map(DetectedLanguage::label)
        .unwrap_or_else(|| UNSUPPORTED_LABEL.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Loaded syntect syntaxes and themes.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Load the default syntaxes and themes bundled with syntect.
    ///
    /// This is relatively expensive; use [`get_highlighter`] to share one
    /// instance.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Look up the grammar for a file by its extension.
    ///
    /// Files without an extension are looked up by their full name, which
    /// covers names like `Makefile`.
    pub fn detect_language(&self, path: &Path) -> Option<DetectedLanguage> {
        let key = path
            .extension()
            .or_else(|| path.file_name())
            .and_then(|s| s.to_str())?;

        match self.syntax_set.find_syntax_by_extension(key) {
            Some(syntax) => Some(DetectedLanguage {
                name: syntax.name.clone(),
            }),
            None => {
                debug!("No grammar for '{}'", path.display());
                None
            }
        }
    }

    fn theme_for_mode(&self, dark_mode: bool) -> Option<&Theme> {
        let name = if dark_mode { DARK_THEME } else { LIGHT_THEME };
        self.theme_set.themes.get(name)
    }

    /// Lay out `text` with syntax colors for `language`.
    ///
    /// Falls back to a single plain section when the language or theme is
    /// unknown. The returned job always contains exactly `text`.
    pub fn layout_job(
        &self,
        text: &str,
        language: Option<&str>,
        font_id: &FontId,
        dark_mode: bool,
        plain_color: Color32,
    ) -> LayoutJob {
        let syntax = language.and_then(|name| self.syntax_set.find_syntax_by_name(name));
        let theme = self.theme_for_mode(dark_mode);

        let (Some(syntax), Some(theme)) = (syntax, theme) else {
            return LayoutJob::simple(text.to_owned(), font_id.clone(), plain_color, f32::INFINITY);
        };

        let mut job = LayoutJob::default();
        let mut highlighter = HighlightLines::new(syntax, theme);

        for line in LinesWithEndings::from(text) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, piece) in ranges {
                        job.append(piece, 0.0, text_format(style, font_id));
                    }
                }
                Err(e) => {
                    warn!("Failed to highlight line: {}", e);
                    job.append(line, 0.0, TextFormat::simple(font_id.clone(), plain_color));
                }
            }
        }

        job
    }
}

/// Convert syntect Color to egui Color32.
pub fn syntect_to_egui_color(color: syntect::highlighting::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn text_format(style: Style, font_id: &FontId) -> TextFormat {
    let color = syntect_to_egui_color(style.foreground);
    TextFormat {
        font_id: font_id.clone(),
        color,
        italics: style.font_style.contains(FontStyle::ITALIC),
        underline: if style.font_style.contains(FontStyle::UNDERLINE) {
            Stroke::new(1.0, color)
        } else {
            Stroke::NONE
        },
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Highlighter Instance
// ─────────────────────────────────────────────────────────────────────────────

static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// Get or create the global syntax highlighter.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Remembers the last highlighted layout so unchanged frames skip syntect.
#[derive(Default)]
pub struct HighlightCache {
    key: Option<u64>,
    job: Option<LayoutJob>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlighted layout for `text`, recomputed only when an input changed.
    pub fn layout_job(
        &mut self,
        text: &str,
        language: Option<&str>,
        font_id: &FontId,
        dark_mode: bool,
        plain_color: Color32,
    ) -> LayoutJob {
        let key = cache_key(text, language, font_id, dark_mode, plain_color);

        if self.key == Some(key) {
            if let Some(job) = &self.job {
                return job.clone();
            }
        }

        let job = get_highlighter().layout_job(text, language, font_id, dark_mode, plain_color);
        self.key = Some(key);
        self.job = Some(job.clone());
        job
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.job = None;
    }
}

fn cache_key(
    text: &str,
    language: Option<&str>,
    font_id: &FontId,
    dark_mode: bool,
    plain_color: Color32,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    language.hash(&mut hasher);
    font_id.size.to_bits().hash(&mut hasher);
    font_id.family.hash(&mut hasher);
    dark_mode.hash(&mut hasher);
    plain_color.hash(&mut hasher);
    hasher.finish()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_rust() {
        let language = get_highlighter().detect_language(Path::new("/src/main.rs"));
        assert_eq!(
            language,
            Some(DetectedLanguage {
                name: "Rust".to_string()
            })
        );
        assert_eq!(
            language_label(language.as_ref()),
            "Detected Language: RUST"
        );
    }

    #[test]
    fn test_detect_by_extension_is_independent_of_directory() {
        let highlighter = get_highlighter();
        assert_eq!(
            highlighter.detect_language(Path::new("a/b/c/script.py")),
            highlighter.detect_language(Path::new("script.py"))
        );
        assert!(highlighter.detect_language(Path::new("script.py")).is_some());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let language = get_highlighter().detect_language(Path::new("notes.zzqqx"));
        assert!(language.is_none());
        assert_eq!(language_label(None), UNSUPPORTED_LABEL);
    }

    #[test]
    fn test_layout_job_preserves_text() {
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let font_id = FontId::monospace(14.0);

        for dark in [true, false] {
            let job =
                get_highlighter().layout_job(code, Some("Rust"), &font_id, dark, Color32::GRAY);
            assert_eq!(job.text, code);
            assert!(job.sections.len() > 1);
        }
    }

    #[test]
    fn test_layout_job_plain_fallback() {
        let font_id = FontId::monospace(14.0);
        let job = get_highlighter().layout_job("hello", None, &font_id, true, Color32::RED);
        assert_eq!(job.text, "hello");
        assert_eq!(job.sections.len(), 1);
        assert_eq!(job.sections[0].format.color, Color32::RED);
    }

    #[test]
    fn test_cache_reuses_and_invalidates() {
        let mut cache = HighlightCache::new();
        let font_id = FontId::monospace(14.0);

        let first = cache.layout_job("let x = 1;", Some("Rust"), &font_id, true, Color32::GRAY);
        let key = cache.key;
        let again = cache.layout_job("let x = 1;", Some("Rust"), &font_id, true, Color32::GRAY);
        assert_eq!(first.text, again.text);
        assert_eq!(cache.key, key);

        let changed = cache.layout_job("let x = 2;", Some("Rust"), &font_id, true, Color32::GRAY);
        assert_eq!(changed.text, "let x = 2;");
        assert_ne!(cache.key, key);

        cache.clear();
        assert!(cache.key.is_none());
    }
}
