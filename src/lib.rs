#![deny(clippy::all)]

pub mod brand_assets;
pub mod config;
pub mod logging;

#[cfg(feature = "node")]
mod node {
    use crate::brand_assets::colors::{self, HexColor, Promotion};
    use crate::brand_assets::format;
    use crate::brand_assets::palette::{self, KMeansQuantizer};
    use crate::brand_assets::{Asset, AssetCategory, BrandColor};
    use napi::bindgen_prelude::*;
    use napi_derive::napi;

    #[napi(object)]
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct JsAsset {
        pub id: String,
        pub brand_id: String,
        pub name: String,
        pub category: String,
        pub url: String,
        pub mime_type: Option<String>,
    }

    #[napi(object)]
    #[derive(Debug, Clone)]
    pub struct JsFormatFolder {
        pub name: String,
        pub assets: Vec<JsAsset>,
    }

    #[napi(object)]
    #[derive(Debug, Clone)]
    pub struct JsBrandColor {
        pub id: String,
        pub name: String,
        pub hex: String,
    }

    fn category_from_js(category: &str) -> AssetCategory {
        match category {
            "Logo" => AssetCategory::Logo,
            "Typography" => AssetCategory::Typography,
            "Imagery" => AssetCategory::Imagery,
            _ => AssetCategory::Other,
        }
    }

    impl From<JsAsset> for Asset {
        fn from(js: JsAsset) -> Self {
            Asset {
                category: category_from_js(&js.category),
                id: js.id,
                brand_id: js.brand_id,
                name: js.name,
                url: js.url,
                thumbnail_url: None,
                mime_type: js.mime_type,
            }
        }
    }

    impl From<Asset> for JsAsset {
        fn from(asset: Asset) -> Self {
            JsAsset {
                category: format!("{:?}", asset.category),
                id: asset.id,
                brand_id: asset.brand_id,
                name: asset.name,
                url: asset.url,
                mime_type: asset.mime_type,
            }
        }
    }

    impl From<JsBrandColor> for BrandColor {
        fn from(js: JsBrandColor) -> Self {
            BrandColor {
                id: js.id,
                name: js.name,
                hex: js.hex,
            }
        }
    }

    impl From<BrandColor> for JsBrandColor {
        fn from(color: BrandColor) -> Self {
            JsBrandColor {
                id: color.id,
                name: color.name,
                hex: color.hex,
            }
        }
    }

    fn max_colors(value: Option<u32>) -> usize {
        value.map_or(palette::DEFAULT_MAX_COLORS, |n| n as usize)
    }

    fn to_hex_strings(colors: Vec<HexColor>) -> Vec<String> {
        colors.into_iter().map(String::from).collect()
    }

    #[napi]
    pub fn init_logging() {
        crate::logging::init_logging();
    }

    #[napi]
    pub fn classify_format(name_or_url: String) -> String {
        format::classify_format(&name_or_url).label().to_string()
    }

    #[napi]
    pub fn group_logo_assets(assets: Vec<JsAsset>) -> Vec<JsFormatFolder> {
        let assets: Vec<Asset> = assets.into_iter().map(Asset::from).collect();

        format::group_by_format(&assets)
            .into_iter()
            .map(|folder| JsFormatFolder {
                name: folder.name,
                assets: folder.assets.into_iter().map(JsAsset::from).collect(),
            })
            .collect()
    }

    #[napi]
    pub fn extract_palette(image: Buffer, max: Option<u32>) -> Vec<String> {
        let quantizer = KMeansQuantizer::default();
        to_hex_strings(palette::extract_palette_from_bytes(
            &quantizer,
            image.as_ref(),
            max_colors(max),
        ))
    }

    #[napi]
    pub fn extract_palette_from_data_url(data_url: String, max: Option<u32>) -> Vec<String> {
        let quantizer = KMeansQuantizer::default();
        to_hex_strings(palette::extract_palette_from_data_url(
            &quantizer,
            &data_url,
            max_colors(max),
        ))
    }

    /// Throws with the validation message when the color is rejected
    #[napi]
    pub fn add_manual_color(input: String, existing: Vec<JsBrandColor>) -> Result<Vec<JsBrandColor>> {
        let existing: Vec<BrandColor> = existing.into_iter().map(BrandColor::from).collect();

        colors::validate_and_add_manual_color(&input, &existing)
            .map(|colors| colors.into_iter().map(JsBrandColor::from).collect())
            .map_err(|e| Error::new(Status::InvalidArg, e.to_string()))
    }

    /// Returns `null` when the color is already in the palette
    #[napi]
    pub fn promote_swatch(hex: String, existing: Vec<JsBrandColor>) -> Option<Vec<JsBrandColor>> {
        let hex = HexColor::parse(&hex).ok()?;
        let existing: Vec<BrandColor> = existing.into_iter().map(BrandColor::from).collect();

        match colors::promote_swatch(&hex, &existing) {
            Promotion::Added(colors) => Some(colors.into_iter().map(JsBrandColor::from).collect()),
            Promotion::Unchanged => None,
        }
    }
}
