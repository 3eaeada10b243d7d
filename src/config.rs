//! Portal configuration, read from a TOML file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tuning for the built-in palette quantizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Images larger than this (in either dimension) are thumbnailed first
    pub sample_size: u32,
    /// Upper bound on k-means clusters (candidate colors)
    pub palette_size: usize,
    /// Pixels with a lower alpha are treated as background
    pub alpha_threshold: u8,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            palette_size: 16,
            alpha_threshold: 125,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Object store bucket for brand logos
    pub logo_bucket: String,
    /// Object store bucket for downloadable assets
    pub asset_bucket: String,
    pub max_suggested_colors: usize,
    pub palette: PaletteConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            logo_bucket: "logos".to_string(),
            asset_bucket: "assets".to_string(),
            max_suggested_colors: crate::brand_assets::palette::DEFAULT_MAX_COLORS,
            palette: PaletteConfig::default(),
        }
    }
}

impl PortalConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse portal config")
    }

    /// Load the config file; a missing file means defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&content)
    }
}
