// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! CynVee Code Editor - Main Entry Point
//!
//! A small code editor with syntax highlighting, a folder file list and
//! settings that persist next to the executable's working directory.

mod app;
mod config;
mod editor;
mod error;
mod files;
mod state;
mod syntax;
mod theme;

use app::{CynVeeApp, APP_NAME};
use config::SettingsStore;
use log::info;
use state::AppState;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let store = SettingsStore::in_working_dir();
    info!("Using settings file {}", store.path().display());
    let state = AppState::new(store);

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([1100.0, 720.0])
        .with_min_inner_size([400.0, 300.0]);

    let native_options = eframe::NativeOptions {
        viewport,
        // Theme switching is handled by ThemeManager
        follow_system_theme: false,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(CynVeeApp::new(cc, state)))),
    )
}
