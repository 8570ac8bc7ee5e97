//! Centralized error handling for the editor
//!
//! This module provides a unified error type that covers settings persistence,
//! document and folder I/O, and clipboard access.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Settings Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The settings file could not be read, created or written
    SettingsIo { path: PathBuf, source: io::Error },

    /// The settings file exists but does not match the document schema
    SettingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Document Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to read a document into the editor
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write the editor contents back to disk
    FileWrite { path: PathBuf, source: io::Error },

    /// Failed to list the files of a folder
    FolderRead {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// System clipboard unavailable or rejected the operation
    Clipboard(String),
}

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Error::Clipboard(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SettingsIo { path, source } => {
                write!(
                    f,
                    "Settings file '{}' is not accessible: {}",
                    path.display(),
                    source
                )
            }
            Error::SettingsParse { path, source } => {
                write!(
                    f,
                    "Settings file '{}' has an invalid format: {}",
                    path.display(),
                    source
                )
            }

            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }
            Error::FolderRead { path, source } => {
                write!(f, "Failed to list folder '{}': {}", path.display(), source)
            }

            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SettingsIo { source, .. } => Some(source),
            Error::SettingsParse { source, .. } => Some(source),
            Error::FileRead { source, .. } => Some(source),
            Error::FileWrite { source, .. } => Some(source),
            Error::FolderRead { source, .. } => Some(source),
            Error::Clipboard(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
