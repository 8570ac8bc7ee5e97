//! Editor module
//!
//! This module contains the syntax highlighting text editor widget.

mod widget;

pub use widget::{resolve_font_family, EditorOptions, EditorWidget, FONT_CHOICES};
