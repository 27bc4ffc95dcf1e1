//! Configuration file management
//!
//! Loads TOML configuration files and provides atlas build settings.
//! Default config path: ~/.config/ftatlas/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::font::Backend;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Font settings
    pub font: FontConfig,
    /// Output settings
    pub export: ExportConfig,
}

/// Font settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font file path (searches well-known locations if empty)
    pub path: String,
    /// Pixel size
    pub size: f32,
    /// Rasterizer: "freetype" (default) or "fontdue"
    pub backend: String,
    /// Number of 256-codepoint atlases (1 covers U+0000..U+00FF)
    pub atlas_count: usize,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            size: 16.0,
            backend: "freetype".to_string(),
            atlas_count: 1,
        }
    }
}

impl FontConfig {
    /// Configured font path, None means search the defaults
    pub fn font_path(&self) -> Option<PathBuf> {
        let path = self.path.trim();
        if path.is_empty() {
            None
        } else {
            Some(expand_path(path))
        }
    }

    /// Parsed backend
    pub fn backend(&self) -> Result<Backend> {
        self.backend.parse::<Backend>().map_err(anyhow::Error::msg)
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory for atlas images and metrics
    pub dir: String,
    /// Also write metrics.toml
    pub metrics: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            metrics: true,
        }
    }
}

impl ExportConfig {
    /// Output directory with ~ expanded
    pub fn dir(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

impl Config {
    /// Load settings from the default location
    ///
    /// Falls back to built-in defaults if the file is missing or invalid.
    pub fn load() -> Self {
        if let Some(path) = default_config_path() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => {
                        info!("Loaded config: {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config {}: {:#}", path.display(), e);
                    }
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ftatlas").join("config.toml"))
}

/// Expand a leading ~ to the home directory
fn expand_path(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
