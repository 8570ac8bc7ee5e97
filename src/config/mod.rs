//! Configuration module for the editor
//!
//! This module handles user preferences, including serialization to and from
//! the JSON settings document and its storage in the working directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
