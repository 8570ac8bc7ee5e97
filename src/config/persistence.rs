//! Settings file persistence
//!
//! The settings live in a single JSON document next to the process's working
//! directory. It is created on first launch, loaded once at startup and
//! rewritten in full after every settings-affecting action.

use crate::config::{Settings, SettingsDocument};
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Settings file name, resolved against the current working directory
pub const SETTINGS_FILE_NAME: &str = "CynVee-Code-Editor-Settings.json";

/// Suffix of the sibling file used while replacing the settings document
const TEMP_SUFFIX: &str = ".tmp";

// ─────────────────────────────────────────────────────────────────────────────
// Settings Store
// ─────────────────────────────────────────────────────────────────────────────

/// Durable storage for [`Settings`] at a fixed path.
///
/// All calls are synchronous and meant to be made from the UI thread only.
///
/// # Examples
///
/// ```ignore
/// let store = SettingsStore::in_working_dir();
/// store.ensure_exists()?;
/// let mut settings = store.load_or_default(|_| {});
/// settings.grid_lines_visible = true;
/// store.save(&settings)?;
/// ```
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for `CynVee-Code-Editor-Settings.json` in the current
    /// working directory.
    ///
    /// If the working directory cannot be determined the bare file name is
    /// used, which the OS resolves against the same directory.
    pub fn in_working_dir() -> Self {
        let path = std::env::current_dir()
            .map(|dir| dir.join(SETTINGS_FILE_NAME))
            .unwrap_or_else(|e| {
                warn!("Could not determine working directory: {}", e);
                PathBuf::from(SETTINGS_FILE_NAME)
            });
        Self::new(path)
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::SettingsIo {
            path: self.path.clone(),
            source,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Create
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the settings file with the initial document if it does not exist.
    ///
    /// The initial document only sets the theme and the row highlight; every
    /// other key is left out and resolves to its default on load. An existing
    /// file is never touched.
    ///
    /// Returns `true` if the file was created by this call.
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingsIo` if the file cannot be created or written.
    pub fn ensure_exists(&self) -> Result<bool> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Settings file already exists at {}", self.path.display());
                return Ok(false);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let json = serde_json::to_string_pretty(&SettingsDocument::initial())
            .map_err(|e| self.io_error(e.into()))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(e))?;

        info!("Created settings file at {}", self.path.display());
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load
    // ─────────────────────────────────────────────────────────────────────────

    /// Load settings from the file.
    ///
    /// A missing or blank file loads as `Settings::default()`.
    ///
    /// # Errors
    ///
    /// - `Error::SettingsIo`: the file exists but cannot be read
    /// - `Error::SettingsParse`: the content is not a valid settings document
    pub fn load(&self) -> Result<Settings> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "Settings file not found at {}, using defaults",
                    self.path.display()
                );
                return Ok(Settings::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if contents.trim().is_empty() {
            debug!("Settings file is empty, using defaults");
            return Ok(Settings::default());
        }

        let settings = Settings::from_json(&contents).map_err(|e| Error::SettingsParse {
            path: self.path.clone(),
            source: e,
        })?;

        info!("Settings loaded from {}", self.path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error.
    ///
    /// The failure is handed to `on_error` before it is logged, so callers
    /// can still report it.
    pub fn load_or_default(&self, on_error: impl FnOnce(&Error)) -> Settings {
        self.load()
            .inspect_err(on_error)
            .unwrap_or_warn_default(Settings::default(), "Failed to load settings")
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────────

    /// Overwrite the settings file with the full document for `settings`.
    ///
    /// The JSON is written to a sibling temporary file which then replaces the
    /// settings file, so a reader never observes a half-written document.
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingsIo` if the document cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let temp_path = self.temp_path();

        let json = serde_json::to_string_pretty(settings).map_err(|e| self.io_error(e.into()))?;

        let write_temp = || -> io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()
        };
        if let Err(e) = write_temp() {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(e));
        }

        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Save settings, logging instead of returning errors.
    ///
    /// Returns `true` if the save was successful.
    pub fn save_silent(&self, settings: &Settings) -> bool {
        match self.save(settings) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SETTINGS_FILE_NAME.into());
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
