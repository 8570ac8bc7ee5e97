//! User settings for the editor
//!
//! This module defines the in-memory `Settings` value held by the shell and
//! the `SettingsDocument` shape it is persisted as. Every key of the document
//! is optional; absent keys resolve to the defaults of `Settings::default()`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Color theme for the editor window.
///
/// Persisted as `"Default"` / `"Light"` / `"Dark"`. Reading is lenient:
/// anything that is not a recognised theme resolves to `System`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Theme {
    /// Follow the operating system preference
    #[default]
    #[serde(rename = "Default")]
    System,
    Light,
    Dark,
}

impl Theme {
    /// Resolve a raw JSON value from the settings file.
    pub fn from_setting_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(name) => Self::from_name(name),
            // Enum ordinals as written by older builds
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(1) => Theme::Light,
                Some(2) => Theme::Dark,
                _ => Theme::System,
            },
            _ => Theme::System,
        }
    }

    fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            "default" | "system" => Theme::System,
            other => {
                log::debug!("Unknown theme '{}', falling back to System", other);
                Theme::System
            }
        }
    }

    /// Get a display label for the theme.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::System => "System",
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    pub fn all() -> &'static [Theme] {
        &[Theme::System, Theme::Light, Theme::Dark]
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Theme::from_setting_value(&value))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Bar Placement
// ─────────────────────────────────────────────────────────────────────────────

/// Which layout row the status bar occupies.
///
/// The main layout grid places the status bar either in row 3 (directly under
/// the menu, above the editor) or in row 5 (under the editor). The row number
/// is what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusBarRow {
    Top,
    #[default]
    Bottom,
}

impl StatusBarRow {
    /// Grid row used by the top placement.
    pub const TOP_ROW: i64 = 3;
    /// Grid row used by the bottom placement.
    pub const BOTTOM_ROW: i64 = 5;

    /// Resolve a persisted row number; anything but 3 or 5 becomes the default.
    pub fn from_row(row: i64) -> Self {
        match row {
            Self::TOP_ROW => StatusBarRow::Top,
            Self::BOTTOM_ROW => StatusBarRow::Bottom,
            other => {
                log::debug!("Status bar row {} out of range, using default", other);
                StatusBarRow::default()
            }
        }
    }

    pub fn row(&self) -> i64 {
        match self {
            StatusBarRow::Top => Self::TOP_ROW,
            StatusBarRow::Bottom => Self::BOTTOM_ROW,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBarRow::Top => "Top",
            StatusBarRow::Bottom => "Bottom",
        }
    }
}

impl Serialize for StatusBarRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.row())
    }
}

impl<'de> Deserialize<'de> for StatusBarRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_i64()
            .map(StatusBarRow::from_row)
            .unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View Toggles
// ─────────────────────────────────────────────────────────────────────────────

/// The boolean view options the user can flip from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewToggle {
    RectangularSelection,
    RowHighlight,
    ShowSpaces,
    ShowTabs,
    ShowColumnRulers,
    ShowEndOfLine,
    ListView,
    StatusBar,
    GridLines,
}

impl ViewToggle {
    /// Menu label for the toggle.
    pub fn label(&self) -> &'static str {
        match self {
            ViewToggle::RectangularSelection => "Rectangular Selection",
            ViewToggle::RowHighlight => "Highlight Current Row",
            ViewToggle::ShowSpaces => "Show Spaces",
            ViewToggle::ShowTabs => "Show Tabs",
            ViewToggle::ShowColumnRulers => "Show Column Rulers",
            ViewToggle::ShowEndOfLine => "Show End of Line",
            ViewToggle::ListView => "File List",
            ViewToggle::StatusBar => "Status Bar",
            ViewToggle::GridLines => "Grid Lines",
        }
    }

    /// Toggles that change how the editor widget draws text.
    pub fn editor_options() -> &'static [ViewToggle] {
        &[
            ViewToggle::RowHighlight,
            ViewToggle::RectangularSelection,
            ViewToggle::ShowSpaces,
            ViewToggle::ShowTabs,
            ViewToggle::ShowEndOfLine,
            ViewToggle::ShowColumnRulers,
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// On-disk Document
// ─────────────────────────────────────────────────────────────────────────────

/// Write a path as a JSON string, replacing invalid UTF-8 with U+FFFD.
///
/// serde_json refuses non-UTF-8 paths outright, which would make every later
/// save fail for as long as the path stays in the settings.
fn serialize_path_lossy<S>(path: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match path {
        Some(path) => {
            if path.to_str().is_none() {
                log::warn!("Path {} is not valid UTF-8, saving it lossily", path.display());
            }
            serializer.serialize_some(path.to_string_lossy().as_ref())
        }
        None => serializer.serialize_none(),
    }
}

/// The JSON object stored in the settings file.
///
/// Keys are PascalCase; camelCase spellings written by earlier builds are
/// accepted on read. `null` and absent keys are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    #[serde(rename = "ThemeSetting", alias = "themeSetting", skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,

    #[serde(rename = "FontSetting", alias = "fontSetting", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(
        rename = "LastUsedFile",
        alias = "lastUsedFile",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_path_lossy"
    )]
    pub last_used_file: Option<PathBuf>,

    #[serde(
        rename = "LastUsedFolder",
        alias = "lastUsedFolder",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_path_lossy"
    )]
    pub last_used_folder: Option<PathBuf>,

    #[serde(
        rename = "RectangularSelectionSetting",
        alias = "rectangularSelectionSetting",
        skip_serializing_if = "Option::is_none"
    )]
    pub rectangular_selection_enabled: Option<bool>,

    #[serde(rename = "RowHighlightSetting", alias = "rowHighlightSetting", skip_serializing_if = "Option::is_none")]
    pub row_highlight_enabled: Option<bool>,

    #[serde(rename = "ShowSpacesSetting", alias = "showSpacesSetting", skip_serializing_if = "Option::is_none")]
    pub show_spaces: Option<bool>,

    #[serde(rename = "ShowTabsSetting", alias = "showTabsSetting", skip_serializing_if = "Option::is_none")]
    pub show_tabs: Option<bool>,

    #[serde(
        rename = "ShowColumnRulersSetting",
        alias = "showColumnRulersSetting",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_column_rulers: Option<bool>,

    #[serde(rename = "ShowEndOfLineSetting", alias = "showEndOfLineSetting", skip_serializing_if = "Option::is_none")]
    pub show_end_of_line: Option<bool>,

    #[serde(rename = "ListViewSetting", alias = "listViewSetting", skip_serializing_if = "Option::is_none")]
    pub list_view_visible: Option<bool>,

    #[serde(
        rename = "StatusBarVisibleSetting",
        alias = "statusBarVisibleSetting",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_bar_visible: Option<bool>,

    #[serde(rename = "GridLinesSetting", alias = "gridLinesSetting", skip_serializing_if = "Option::is_none")]
    pub grid_lines_visible: Option<bool>,

    #[serde(rename = "StatusBarSetting", alias = "statusBarSetting", skip_serializing_if = "Option::is_none")]
    pub status_bar_row: Option<StatusBarRow>,
}

impl SettingsDocument {
    /// The document written when no settings file exists yet.
    pub fn initial() -> Self {
        Self {
            theme: Some(Theme::System),
            row_highlight_enabled: Some(true),
            ..Self::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and last-used paths.
///
/// This is the single source of truth between a load and the next save. It
/// (de)serializes through `SettingsDocument`, so a settings file with any
/// subset of keys loads into a fully populated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SettingsDocument", into = "SettingsDocument")]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    pub theme: Theme,
    /// Editor font family name; `None` uses the UI default
    pub font_family: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    pub last_used_file: Option<PathBuf>,
    pub last_used_folder: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Options
    // ─────────────────────────────────────────────────────────────────────────
    pub rectangular_selection_enabled: bool,
    pub row_highlight_enabled: bool,
    pub show_spaces: bool,
    pub show_tabs: bool,
    pub show_column_rulers: bool,
    pub show_end_of_line: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────────
    pub list_view_visible: bool,
    pub status_bar_visible: bool,
    pub grid_lines_visible: bool,
    pub status_bar_row: StatusBarRow,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_family: None,

            last_used_file: None,
            last_used_folder: None,

            rectangular_selection_enabled: true,
            row_highlight_enabled: true,
            show_spaces: false,
            show_tabs: false,
            show_column_rulers: false,
            show_end_of_line: false,

            list_view_visible: true,
            status_bar_visible: true,
            grid_lines_visible: false,
            status_bar_row: StatusBarRow::default(),
        }
    }
}

impl From<SettingsDocument> for Settings {
    fn from(doc: SettingsDocument) -> Self {
        let defaults = Settings::default();
        Self {
            theme: doc.theme.unwrap_or(defaults.theme),
            font_family: doc.font_family.filter(|name| !name.trim().is_empty()),
            last_used_file: doc.last_used_file,
            last_used_folder: doc.last_used_folder,
            rectangular_selection_enabled: doc
                .rectangular_selection_enabled
                .unwrap_or(defaults.rectangular_selection_enabled),
            row_highlight_enabled: doc
                .row_highlight_enabled
                .unwrap_or(defaults.row_highlight_enabled),
            show_spaces: doc.show_spaces.unwrap_or(defaults.show_spaces),
            show_tabs: doc.show_tabs.unwrap_or(defaults.show_tabs),
            show_column_rulers: doc
                .show_column_rulers
                .unwrap_or(defaults.show_column_rulers),
            show_end_of_line: doc.show_end_of_line.unwrap_or(defaults.show_end_of_line),
            list_view_visible: doc.list_view_visible.unwrap_or(defaults.list_view_visible),
            status_bar_visible: doc
                .status_bar_visible
                .unwrap_or(defaults.status_bar_visible),
            grid_lines_visible: doc
                .grid_lines_visible
                .unwrap_or(defaults.grid_lines_visible),
            status_bar_row: doc.status_bar_row.unwrap_or(defaults.status_bar_row),
        }
    }
}

impl From<Settings> for SettingsDocument {
    fn from(settings: Settings) -> Self {
        Self {
            theme: Some(settings.theme),
            font_family: settings.font_family,
            last_used_file: settings.last_used_file,
            last_used_folder: settings.last_used_folder,
            rectangular_selection_enabled: Some(settings.rectangular_selection_enabled),
            row_highlight_enabled: Some(settings.row_highlight_enabled),
            show_spaces: Some(settings.show_spaces),
            show_tabs: Some(settings.show_tabs),
            show_column_rulers: Some(settings.show_column_rulers),
            show_end_of_line: Some(settings.show_end_of_line),
            list_view_visible: Some(settings.list_view_visible),
            status_bar_visible: Some(settings.status_bar_visible),
            grid_lines_visible: Some(settings.grid_lines_visible),
            status_bar_row: Some(settings.status_bar_row),
        }
    }
}

impl Settings {
    /// Current value of a view toggle.
    pub fn is_enabled(&self, toggle: ViewToggle) -> bool {
        match toggle {
            ViewToggle::RectangularSelection => self.rectangular_selection_enabled,
            ViewToggle::RowHighlight => self.row_highlight_enabled,
            ViewToggle::ShowSpaces => self.show_spaces,
            ViewToggle::ShowTabs => self.show_tabs,
            ViewToggle::ShowColumnRulers => self.show_column_rulers,
            ViewToggle::ShowEndOfLine => self.show_end_of_line,
            ViewToggle::ListView => self.list_view_visible,
            ViewToggle::StatusBar => self.status_bar_visible,
            ViewToggle::GridLines => self.grid_lines_visible,
        }
    }

    pub fn set_enabled(&mut self, toggle: ViewToggle, enabled: bool) {
        let field = match toggle {
            ViewToggle::RectangularSelection => &mut self.rectangular_selection_enabled,
            ViewToggle::RowHighlight => &mut self.row_highlight_enabled,
            ViewToggle::ShowSpaces => &mut self.show_spaces,
            ViewToggle::ShowTabs => &mut self.show_tabs,
            ViewToggle::ShowColumnRulers => &mut self.show_column_rulers,
            ViewToggle::ShowEndOfLine => &mut self.show_end_of_line,
            ViewToggle::ListView => &mut self.list_view_visible,
            ViewToggle::StatusBar => &mut self.status_bar_visible,
            ViewToggle::GridLines => &mut self.grid_lines_visible,
        };
        *field = enabled;
    }

    /// Flip a view toggle and return its new value.
    pub fn toggle(&mut self, toggle: ViewToggle) -> bool {
        let enabled = !self.is_enabled(toggle);
        self.set_enabled(toggle, enabled);
        enabled
    }

    /// Parse a settings document, resolving every absent key to its default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.theme, Theme::System);
        assert!(settings.row_highlight_enabled);
        assert!(settings.rectangular_selection_enabled);
        assert!(settings.list_view_visible);
        assert!(settings.status_bar_visible);
        assert_eq!(settings.status_bar_row.row(), 5);
        assert!(!settings.show_spaces);
        assert!(!settings.show_tabs);
        assert!(!settings.show_column_rulers);
        assert!(!settings.show_end_of_line);
        assert!(!settings.grid_lines_visible);
        assert!(settings.font_family.is_none());
        assert!(settings.last_used_file.is_none());
        assert!(settings.last_used_folder.is_none());
    }

    #[test]
    fn test_empty_document_resolves_to_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_theme_falls_back_to_system() {
        let settings = Settings::from_json(r#"{"ThemeSetting": "Purple"}"#).unwrap();
        assert_eq!(settings.theme, Theme::System);

        let settings = Settings::from_json(r#"{"ThemeSetting": 42}"#).unwrap();
        assert_eq!(settings.theme, Theme::System);
    }

    #[test]
    fn test_theme_names_are_case_insensitive() {
        let settings = Settings::from_json(r#"{"ThemeSetting": "dark"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);

        let settings = Settings::from_json(r#"{"themeSetting": "LIGHT"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Light);

        let settings = Settings::from_json(r#"{"ThemeSetting": "System"}"#).unwrap();
        assert_eq!(settings.theme, Theme::System);
    }

    #[test]
    fn test_theme_ordinals() {
        let settings = Settings::from_json(r#"{"ThemeSetting": 2}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_theme_serialization() {
        assert_eq!(serde_json::to_string(&Theme::System).unwrap(), "\"Default\"");
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"Light\"");
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"Dark\"");
    }

    #[test]
    fn test_out_of_range_status_bar_row() {
        let settings = Settings::from_json(r#"{"statusBarSetting": 7}"#).unwrap();
        assert_eq!(settings.status_bar_row, StatusBarRow::Bottom);

        let settings = Settings::from_json(r#"{"StatusBarSetting": "top"}"#).unwrap();
        assert_eq!(settings.status_bar_row, StatusBarRow::Bottom);
    }

    #[test]
    fn test_status_bar_row_top() {
        let settings = Settings::from_json(r#"{"StatusBarSetting": 3}"#).unwrap();
        assert_eq!(settings.status_bar_row, StatusBarRow::Top);
        assert_eq!(serde_json::to_string(&StatusBarRow::Top).unwrap(), "3");
    }

    #[test]
    fn test_null_values_resolve_to_defaults() {
        let json = r#"{
            "ThemeSetting": null,
            "FontSetting": null,
            "RowHighlightSetting": null,
            "ListViewSetting": null,
            "StatusBarSetting": null
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        assert!(Settings::from_json(r#"{"ShowTabsSetting": "yes"}"#).is_err());
        assert!(Settings::from_json("42").is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings =
            Settings::from_json(r#"{"GridLinesSetting": true, "FutureSetting": 1}"#).unwrap();
        assert!(settings.grid_lines_visible);
    }

    #[test]
    fn test_blank_font_is_treated_as_absent() {
        let settings = Settings::from_json(r#"{"FontSetting": "  "}"#).unwrap();
        assert!(settings.font_family.is_none());
    }

    #[test]
    fn test_full_document_roundtrip() {
        let original = Settings {
            theme: Theme::Dark,
            font_family: Some("Monospace".to_string()),
            last_used_file: Some(PathBuf::from("/home/user/project/main.rs")),
            last_used_folder: Some(PathBuf::from("/home/user/project")),
            rectangular_selection_enabled: false,
            row_highlight_enabled: false,
            show_spaces: true,
            show_tabs: true,
            show_column_rulers: true,
            show_end_of_line: true,
            list_view_visible: false,
            status_bar_visible: false,
            grid_lines_visible: true,
            status_bar_row: StatusBarRow::Top,
        };

        let json = serde_json::to_string_pretty(&original).unwrap();
        let loaded = Settings::from_json(&json).unwrap();
        assert_eq!(original, loaded);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_saved_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let settings = Settings {
            last_used_file: Some(PathBuf::from(OsStr::from_bytes(b"/tmp/caf\xe9.rs"))),
            last_used_folder: Some(PathBuf::from("/tmp")),
            ..Settings::default()
        };

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let loaded = Settings::from_json(&json).unwrap();
        assert_eq!(
            loaded.last_used_file,
            Some(PathBuf::from("/tmp/caf\u{FFFD}.rs"))
        );
        assert_eq!(loaded.last_used_folder, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_serialized_document_contains_every_flag() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "ThemeSetting",
            "RectangularSelectionSetting",
            "RowHighlightSetting",
            "ShowSpacesSetting",
            "ShowTabsSetting",
            "ShowColumnRulersSetting",
            "ShowEndOfLineSetting",
            "ListViewSetting",
            "StatusBarVisibleSetting",
            "GridLinesSetting",
            "StatusBarSetting",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert!(!object.contains_key("FontSetting"));
    }

    #[test]
    fn test_initial_document() {
        let json = serde_json::to_string(&SettingsDocument::initial()).unwrap();
        assert_eq!(json, r#"{"ThemeSetting":"Default","RowHighlightSetting":true}"#);

        let settings = Settings::from(SettingsDocument::initial());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_toggle_flips_and_reports() {
        let mut settings = Settings::default();
        assert!(settings.toggle(ViewToggle::GridLines));
        assert!(settings.grid_lines_visible);
        assert!(!settings.toggle(ViewToggle::GridLines));
        assert!(!settings.grid_lines_visible);

        assert!(!settings.toggle(ViewToggle::ListView));
        assert!(!settings.list_view_visible);
    }

    #[test]
    fn test_set_enabled_touches_only_one_field() {
        let mut settings = Settings::default();
        settings.set_enabled(ViewToggle::ShowEndOfLine, true);

        let mut expected = Settings::default();
        expected.show_end_of_line = true;
        assert_eq!(settings, expected);
    }
}
