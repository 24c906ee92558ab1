use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Limits and resources for the native rendering host, loaded from YAML.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Largest accepted surface width or height in pixels
    pub max_surface_side: u32,

    /// Largest accepted surface area (width * height)
    pub max_surface_area: u64,

    /// JPEG quality used when the requested quality is outside 0..=1
    pub default_jpeg_quality: f32,

    /// Load the system fonts for text rendering
    pub load_system_fonts: bool,

    /// Extra font directories
    pub font_dirs: Vec<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_surface_side: 32_767,
            max_surface_area: 268_435_456, // 16384 * 16384
            default_jpeg_quality: 0.92,
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Parse configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration, falling back to defaults when it can't be read
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    max_surface_side = config.max_surface_side,
                    font_dirs = config.font_dirs.len(),
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to load config, using defaults");
                Self::default()
            }
        }
    }
}
