//! Theme management
//!
//! Applies the persisted `Theme` preference to the egui context. `System`
//! follows the OS light/dark preference reported by eframe and falls back to
//! dark visuals when the platform reports nothing.

use egui::{Context, Visuals};
use log::{debug, info};

use crate::config::Theme;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks the selected theme and applies it to egui when it changes.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    current_theme: Theme,
    needs_apply: bool,
    /// Last OS preference seen while following the system theme
    last_system_dark_mode: Option<bool>,
}

impl ThemeManager {
    pub fn new(theme: Theme) -> Self {
        info!("ThemeManager initialized with theme: {:?}", theme);
        Self {
            current_theme: theme,
            needs_apply: true,
            last_system_dark_mode: None,
        }
    }

    pub fn current_theme(&self) -> Theme {
        self.current_theme
    }

    /// Select a theme. Takes effect on the next `apply_if_needed`.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.current_theme != theme {
            info!("Theme changed from {:?} to {:?}", self.current_theme, theme);
            self.current_theme = theme;
            self.needs_apply = true;
        }
    }

    /// Whether the effective theme is dark.
    pub fn is_dark(&self, system_dark: Option<bool>) -> bool {
        match self.current_theme {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::System => system_dark.unwrap_or(true),
        }
    }

    /// Visuals for the effective theme.
    pub fn visuals(&self, system_dark: Option<bool>) -> Visuals {
        if self.is_dark(system_dark) {
            Visuals::dark()
        } else {
            Visuals::light()
        }
    }

    /// Apply the current theme to the egui context.
    pub fn apply(&mut self, ctx: &Context, system_dark: Option<bool>) {
        ctx.set_visuals(self.visuals(system_dark));
        self.needs_apply = false;
        debug!("Applied theme: {:?}", self.current_theme);
    }

    /// Apply the theme only if it or the followed OS preference changed.
    ///
    /// Returns `true` if the theme was applied.
    pub fn apply_if_needed(&mut self, ctx: &Context, system_dark: Option<bool>) -> bool {
        if self.current_theme == Theme::System && self.last_system_dark_mode != system_dark {
            debug!("System dark mode changed to: {:?}", system_dark);
            self.last_system_dark_mode = system_dark;
            self.needs_apply = true;
        }

        if self.needs_apply {
            self.apply(ctx, system_dark);
            true
        } else {
            false
        }
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_manager_new() {
        let manager = ThemeManager::new(Theme::Dark);
        assert_eq!(manager.current_theme(), Theme::Dark);
        assert!(manager.needs_apply);
    }

    #[test]
    fn test_theme_manager_default_follows_system() {
        assert_eq!(ThemeManager::default().current_theme(), Theme::System);
    }

    #[test]
    fn test_theme_manager_set_same_theme() {
        let mut manager = ThemeManager::new(Theme::Light);
        manager.needs_apply = false;

        manager.set_theme(Theme::Light);
        assert!(!manager.needs_apply);

        manager.set_theme(Theme::Dark);
        assert!(manager.needs_apply);
    }

    #[test]
    fn test_effective_darkness() {
        let mut manager = ThemeManager::new(Theme::Light);
        assert!(!manager.is_dark(Some(true)));
        assert!(!manager.visuals(Some(true)).dark_mode);

        manager.set_theme(Theme::Dark);
        assert!(manager.is_dark(Some(false)));

        manager.set_theme(Theme::System);
        assert!(!manager.is_dark(Some(false)));
        assert!(manager.is_dark(Some(true)));
        assert!(manager.is_dark(None));
    }

    #[test]
    fn test_apply_if_needed_tracks_system_changes() {
        let ctx = Context::default();
        let mut manager = ThemeManager::new(Theme::System);

        assert!(manager.apply_if_needed(&ctx, Some(false)));
        assert!(!ctx.style().visuals.dark_mode);
        assert!(!manager.apply_if_needed(&ctx, Some(false)));

        assert!(manager.apply_if_needed(&ctx, Some(true)));
        assert!(ctx.style().visuals.dark_mode);
    }

    #[test]
    fn test_explicit_theme_ignores_system() {
        let ctx = Context::default();
        let mut manager = ThemeManager::new(Theme::Light);

        assert!(manager.apply_if_needed(&ctx, Some(true)));
        assert!(!manager.apply_if_needed(&ctx, Some(false)));
        assert!(!ctx.style().visuals.dark_mode);
    }
}
