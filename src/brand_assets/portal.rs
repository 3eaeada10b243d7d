use super::colors::HexColor;
use super::format::{FormatFolder, group_by_format};
use super::palette::{KMeansQuantizer, extract_palette_async};
use super::{Asset, AssetCategory, BrandColor, BrandRecord};
use crate::config::PortalConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File storage for logos and assets. Uploads never overwrite.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, bucket: &str, path: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Relational storage for brands, their colors and their assets
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_brand(&self, brand: NewBrand) -> Result<BrandRecord>;

    async fn select_brand(&self, brand_id: &str) -> Result<Option<BrandRecord>>;

    async fn select_brands_by_owner(&self, owner_id: &str) -> Result<Vec<BrandRecord>>;

    /// Rows of the dedicated `brand_colors` table
    async fn select_brand_colors(&self, brand_id: &str) -> Result<Vec<BrandColor>>;

    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset>;

    async fn select_assets(&self, brand_id: &str) -> Result<Vec<Asset>>;
}

/// Brand row to insert; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: String,
    pub owner_id: Option<String>,
    pub colors: Vec<BrandColor>,
    pub fonts: Vec<String>,
}

/// Asset row to insert; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAsset {
    pub brand_id: String,
    pub name: String,
    pub category: AssetCategory,
    pub url: String,
    pub mime_type: Option<String>,
}

/// File received from an upload form
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Submitted "new brand" form
#[derive(Debug, Clone, Default)]
pub struct BrandForm {
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<UploadedFile>,
    pub colors: Vec<BrandColor>,
    pub fonts: Vec<String>,
}

/// Everything the brand detail page shows
#[derive(Debug, Clone)]
pub struct BrandPage {
    pub brand: BrandRecord,
    pub colors: Vec<BrandColor>,
    pub assets: Vec<Asset>,
}

impl BrandPage {
    /// Logo assets grouped by download format, recomputed on each call
    pub fn logo_folders(&self) -> Vec<FormatFolder> {
        group_by_format(&self.assets)
    }

    /// Non-logo assets, listed flat
    pub fn other_assets(&self) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|a| a.category != AssetCategory::Logo)
            .collect()
    }

    /// Show a freshly uploaded asset first
    pub fn prepend_asset(&mut self, asset: Asset) {
        self.assets.insert(0, asset);
    }
}

/// Object store key for an uploaded file: `{unix millis}-{random}.{ext}`
pub fn storage_file_name(original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(original_name);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = uuid::Uuid::new_v4().simple().to_string();

    format!("{}-{}.{}", millis, &random[..10], ext)
}

/// Brand portal operations over the storage collaborators.
///
/// Owner ids are passed in explicitly; resolving the signed-in user is the
/// caller's job.
pub struct Portal<R, O> {
    records: R,
    objects: O,
    config: PortalConfig,
}

impl<R: RecordStore, O: ObjectStore> Portal<R, O> {
    pub fn new(records: R, objects: O, config: PortalConfig) -> Self {
        Self {
            records,
            objects,
            config,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    /// Suggested brand colors for a selected logo file, using the
    /// configured quantizer settings
    pub async fn suggest_logo_colors(&self, logo: Vec<u8>) -> Vec<HexColor> {
        let quantizer = Arc::new(KMeansQuantizer::new(self.config.palette.clone()));
        extract_palette_async(quantizer, logo, self.config.max_suggested_colors).await
    }

    /// Upload the logo (if any) and insert the brand row.
    /// A failed upload aborts before anything is inserted.
    pub async fn create_brand(&self, owner_id: Option<&str>, form: BrandForm) -> Result<BrandRecord> {
        let mut logo_url = String::new();

        if let Some(logo) = form.logo.as_ref().filter(|f| !f.bytes.is_empty()) {
            let path = storage_file_name(&logo.name);
            let content_type = logo.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

            self.objects
                .upload(&self.config.logo_bucket, &path, &logo.bytes, content_type)
                .await
                .context("Failed to upload logo")?;

            logo_url = self.objects.public_url(&self.config.logo_bucket, &path);
            tracing::info!("Uploaded logo {} to {}", logo.name, path);
        }

        let brand = self
            .records
            .insert_brand(NewBrand {
                name: form.name,
                description: form.description,
                logo_url,
                owner_id: owner_id.map(str::to_string),
                colors: form.colors,
                fonts: form.fonts,
            })
            .await
            .context("Failed to create brand")?;

        tracing::info!("Created brand {} ({})", brand.name, brand.id);
        Ok(brand)
    }

    /// Store a file under `{brand_id}/` and record it as a logo asset
    pub async fn upload_asset(&self, brand_id: &str, file: Option<UploadedFile>) -> Result<Asset> {
        let file = match file {
            Some(file) if !brand_id.is_empty() => file,
            _ => anyhow::bail!("Missing brandId or file"),
        };

        let path = format!("{}/{}", brand_id, storage_file_name(&file.name));
        let content_type = file
            .content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        self.objects
            .upload(&self.config.asset_bucket, &path, &file.bytes, content_type)
            .await
            .context("Failed to upload asset")?;

        let url = self.objects.public_url(&self.config.asset_bucket, &path);

        let asset = self
            .records
            .insert_asset(NewAsset {
                brand_id: brand_id.to_string(),
                name: file.name,
                category: AssetCategory::Logo,
                url,
                mime_type: file.content_type.filter(|t| !t.is_empty()),
            })
            .await
            .context("Failed to record asset")?;

        tracing::info!("Uploaded asset {} for brand {}", asset.name, brand_id);
        Ok(asset)
    }

    /// Dashboard listing for one owner
    pub async fn list_owned_brands(&self, owner_id: &str) -> Result<Vec<BrandRecord>> {
        self.records
            .select_brands_by_owner(owner_id)
            .await
            .context("Failed to list brands")
    }

    /// Load a brand with its colors and assets. `None` when the brand does
    /// not exist.
    ///
    /// Colors come from the dedicated colors table when that read succeeds,
    /// and from the brand row's embedded colors otherwise. An asset read
    /// failure shows an empty asset list.
    pub async fn load_brand_page(&self, brand_id: &str) -> Result<Option<BrandPage>> {
        let Some(brand) = self
            .records
            .select_brand(brand_id)
            .await
            .context("Failed to load brand")?
        else {
            return Ok(None);
        };

        let colors = match self.records.select_brand_colors(brand_id).await {
            Ok(colors) => colors,
            Err(e) => {
                tracing::warn!("Colors table unavailable, using embedded colors: {:#}", e);
                brand.colors.clone()
            }
        };

        let assets = self
            .records
            .select_assets(brand_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load assets for brand {}: {:#}", brand_id, e);
                Vec::new()
            });

        Ok(Some(BrandPage {
            brand,
            colors,
            assets,
        }))
    }
}
