pub mod colors;
pub mod format;
pub mod palette;
pub mod portal;
pub mod suggestions;

use serde::{Deserialize, Serialize};

/// Category chosen by the uploader, persisted with the asset row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    Logo,
    Typography,
    Imagery,
    Other,
}

/// Downloadable brand asset as stored in the `brand_assets` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub category: AssetCategory,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Named color attached to a brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColor {
    pub id: String,
    pub name: String,
    pub hex: String,
}

/// Brand row, including the embedded color and font columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub colors: Vec<BrandColor>,
    #[serde(default)]
    pub fonts: Vec<String>,
}
