//! Configuration file support for sbs
//!
//! Config file location: `~/.config/sbs/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [ui]
//! cursor_marker = "▶"
//! syntax = "auto"
//!
//! [ui.colors]
//! insert = "#A3BE8C"
//! delete = "#BF616A"
//!
//! [diff]
//! context = 10          # or "all"
//! intraline_difference = true
//! ignore_whitespace = false
//! show_line_numbers = true
//! show_tabs = true
//! show_whitespace_errors = true
//! tab_size = 8
//! expand_all_comments = false
//! ```

use crate::color::ColorConfig;
use sbs_core::DiffPreferences;
use serde::Deserialize;
use std::path::PathBuf;

/// UI configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Marker drawn in the gutter of the focused cursor line
    pub cursor_marker: String,
    /// Syntax highlighting: "auto", "on", or "off"
    pub syntax: SyntaxMode,
    /// Colour overrides
    pub colors: ColorConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            cursor_marker: "▶".to_string(),
            syntax: SyntaxMode::Auto,
            colors: ColorConfig::default(),
        }
    }
}

/// Syntax highlighting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxMode {
    /// Follow `diff.syntax_highlighting`
    #[default]
    Auto,
    On,
    Off,
}

/// Root configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub diff: DiffPreferences,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("sbs").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("sbs").join("config.toml"));
        }

        // Platform-specific config dir (~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("sbs").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Load config from XDG config path
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    fn parse(content: &str) -> Self {
        toml::from_str(content)
            .map_err(|e| {
                eprintln!("Warning: Failed to parse config: {}", e);
                log::warn!("failed to parse config: {e}");
                e
            })
            .unwrap_or_default()
    }

    /// Whether syntax highlighting starts on
    pub fn syntax_enabled(&self) -> bool {
        match self.ui.syntax {
            SyntaxMode::Auto => self.diff.syntax_highlighting,
            SyntaxMode::On => true,
            SyntaxMode::Off => false,
        }
    }
}
