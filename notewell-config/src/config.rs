//! Workbench configuration management.
//!
//! This module provides configuration loading, saving, and default values
//! for the workbench layout engine. The config file lives at
//! `~/.config/notewell/config.yaml`.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Workbench configuration.
///
/// All fields have serde defaults so a partial config file upgrades
/// cleanly across versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of open tabs per pane. Adding a tab past the cap
    /// evicts the least-recently-active unpinned, unfocused tab.
    pub max_open_tab_count: usize,

    /// Drop unpinned tabs when reconstructing the layout at startup.
    pub close_tabs_on_start: bool,

    /// Delay before a dropped push channel reconnects, in milliseconds.
    pub reconnect_delay_ms: u64,

    /// Trailing-edge debounce for the resize/save flush, in milliseconds.
    pub resize_debounce_ms: u64,

    /// Minimum height for panes under a column split, so a freshly added
    /// pane is never zero-height before its content loads.
    pub min_pane_height: f32,

    /// Minimum cross-axis size for side dock panels.
    pub dock_panel_min_size: f32,

    /// Minimum cross-axis size for side dock panels that host a canvas
    /// (graph, backlink) and need more room to be usable.
    pub dock_panel_min_size_wide: f32,

    /// Minimum height for bottom dock panels.
    pub dock_bottom_min_size: f32,

    /// Kernel host the push channels connect to.
    pub kernel_host: String,

    /// Use `wss://` instead of `ws://` for push channels.
    pub kernel_tls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_open_tab_count: 8,
            close_tabs_on_start: false,
            reconnect_delay_ms: 3000,
            resize_debounce_ms: 200,
            min_pane_height: 64.0,
            dock_panel_min_size: 227.0,
            dock_panel_min_size_wide: 320.0,
            dock_bottom_min_size: 64.0,
            kernel_host: "127.0.0.1:6806".to_string(),
            kernel_tls: false,
        }
    }
}

impl Config {
    /// Default config file path (`~/.config/notewell/config.yaml`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notewell")
            .join("config.yaml")
    }

    /// Load the config from the default location, falling back to defaults
    /// when the file does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load the config from a specific file.
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config file at {path:?}, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Save the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path())
    }

    /// Save the config to a specific file, creating parent directories.
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let contents = serde_yaml_ng::to_string(self).expect("config serialization is infallible");
        fs::write(&path, contents).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Saved config to {path:?}");
        Ok(())
    }

    /// WebSocket endpoint for push channels.
    pub fn push_endpoint(&self) -> String {
        let scheme = if self.kernel_tls { "wss" } else { "ws" };
        format!("{scheme}://{}/ws", self.kernel_host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.max_open_tab_count, 8);
        assert_eq!(config.reconnect_delay_ms, 3000);
        assert_eq!(config.resize_debounce_ms, 200);
        assert!(!config.close_tabs_on_start);
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load_from(temp.path().join("nope.yaml")).unwrap();
        assert_eq!(config.max_open_tab_count, 8);
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.max_open_tab_count = 20;
        config.kernel_host = "127.0.0.1:7000".to_string();
        config.save_to(path.clone()).unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.max_open_tab_count, 20);
        assert_eq!(loaded.kernel_host, "127.0.0.1:7000");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "max_open_tab_count: 3\n").unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.max_open_tab_count, 3);
        assert_eq!(loaded.reconnect_delay_ms, 3000);
    }

    #[test]
    fn push_endpoint_scheme() {
        let mut config = Config::default();
        assert_eq!(config.push_endpoint(), "ws://127.0.0.1:6806/ws");
        config.kernel_tls = true;
        assert_eq!(config.push_endpoint(), "wss://127.0.0.1:6806/ws");
    }
}
