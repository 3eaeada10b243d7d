use super::{Asset, AssetCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

const NEUTRAL_BASE: &str = "http://example.com";

/// Download format of an asset, derived from its file extension.
///
/// The declaration order is the order folders are presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatGroup {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "EPS")]
    Eps,
    #[serde(rename = "PNG/JPG")]
    PngJpg,
    Other,
}

impl FormatGroup {
    pub const ALL: [FormatGroup; 5] = [
        FormatGroup::Ai,
        FormatGroup::Pdf,
        FormatGroup::Eps,
        FormatGroup::PngJpg,
        FormatGroup::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormatGroup::Ai => "AI",
            FormatGroup::Pdf => "PDF",
            FormatGroup::Eps => "EPS",
            FormatGroup::PngJpg => "PNG/JPG",
            FormatGroup::Other => "Other",
        }
    }

    fn from_extension(ext: &str) -> Self {
        match ext {
            "ai" => FormatGroup::Ai,
            "pdf" => FormatGroup::Pdf,
            "eps" => FormatGroup::Eps,
            "png" | "jpg" | "jpeg" => FormatGroup::PngJpg,
            _ => FormatGroup::Other,
        }
    }
}

impl fmt::Display for FormatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Folder of logo assets sharing one download format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatFolder {
    pub format: FormatGroup,
    pub name: String,
    pub assets: Vec<Asset>,
}

/// Resolve the file name part of a name or URL.
/// Query strings and fragments are dropped when the input parses as a URL;
/// otherwise the raw input is the file name.
fn resolve_file_name(name_or_url: &str) -> String {
    let joined = Url::parse(NEUTRAL_BASE).and_then(|base| base.join(name_or_url));

    match joined {
        Ok(url) => {
            let last = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or("");
            if last.is_empty() {
                name_or_url.to_string()
            } else {
                last.to_string()
            }
        }
        Err(_) => name_or_url.to_string(),
    }
}

/// Lower-cased text after the final `.`, or empty when there is none
fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classify a file name or URL into its format group. Never fails;
/// anything unrecognised is `Other`.
pub fn classify_format(name_or_url: &str) -> FormatGroup {
    let file_name = resolve_file_name(name_or_url);
    FormatGroup::from_extension(&extension_of(&file_name))
}

/// Classify an asset by its name, falling back to its URL when the name
/// has no usable extension. Display names like `Brand Logo v1.2` say
/// nothing about the format, while the stored URL keeps the real one.
pub fn classify_asset(asset: &Asset) -> FormatGroup {
    match classify_format(&asset.name) {
        FormatGroup::Other => classify_format(&asset.url),
        known => known,
    }
}

/// Group logo assets into format folders.
///
/// Only assets in the `Logo` category take part. Folders come out in
/// `FormatGroup` order, empty folders are left out, and assets keep the
/// order they were supplied in.
pub fn group_by_format(assets: &[Asset]) -> Vec<FormatFolder> {
    let mut buckets: BTreeMap<FormatGroup, Vec<Asset>> = BTreeMap::new();

    for asset in assets.iter().filter(|a| a.category == AssetCategory::Logo) {
        buckets
            .entry(classify_asset(asset))
            .or_default()
            .push(asset.clone());
    }

    let folders: Vec<FormatFolder> = buckets
        .into_iter()
        .map(|(format, assets)| FormatFolder {
            format,
            name: format.label().to_string(),
            assets,
        })
        .collect();

    tracing::debug!(
        "Created {} format folders from {} assets",
        folders.len(),
        assets.len()
    );

    folders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, name: &str, category: AssetCategory) -> Asset {
        Asset {
            id: id.to_string(),
            brand_id: "brand-1".to_string(),
            name: name.to_string(),
            category,
            url: format!("https://cdn.example.com/assets/brand-1/{}", id),
            thumbnail_url: None,
            mime_type: None,
        }
    }

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify_format("mark.ai"), FormatGroup::Ai);
        assert_eq!(classify_format("guide.pdf"), FormatGroup::Pdf);
        assert_eq!(classify_format("print.eps"), FormatGroup::Eps);
        assert_eq!(classify_format("logo.png"), FormatGroup::PngJpg);
        assert_eq!(classify_format("logo.jpg"), FormatGroup::PngJpg);
        assert_eq!(classify_format("logo.jpeg"), FormatGroup::PngJpg);
        assert_eq!(classify_format("logo.svg"), FormatGroup::Other);
    }

    #[test]
    fn test_classify_is_total() {
        let inputs = [
            "",
            "README",
            "archive.",
            "a.b.c.pdf",
            "a.pdf.zip",
            "http://[::1",
            "http://",
            "::::",
            "%%%.png",
            "https://cdn.example.com",
            "..",
            "#.ai",
            "?.pdf",
        ];
        for input in inputs {
            let group = classify_format(input);
            assert!(FormatGroup::ALL.contains(&group), "{input:?} -> {group:?}");
        }
        assert_eq!(classify_format(""), FormatGroup::Other);
        assert_eq!(classify_format("README"), FormatGroup::Other);
        assert_eq!(classify_format("archive."), FormatGroup::Other);
        assert_eq!(classify_format("a.b.c.pdf"), FormatGroup::Pdf);
        assert_eq!(classify_format("a.pdf.zip"), FormatGroup::Other);
        assert_eq!(classify_format("https://cdn.example.com"), FormatGroup::Other);
    }

    #[test]
    fn test_classify_ignores_case() {
        assert_eq!(classify_format("LOGO.PNG"), classify_format("logo.png"));
        assert_eq!(classify_format("LOGO.PNG"), FormatGroup::PngJpg);
        assert_eq!(classify_format("Brand.Ai"), FormatGroup::Ai);
    }

    #[test]
    fn test_classify_url_and_bare_name_agree() {
        assert_eq!(
            classify_format("https://cdn.example.com/x/y/file.ai?query=1"),
            FormatGroup::Ai
        );
        assert_eq!(classify_format("file.ai"), FormatGroup::Ai);
        assert_eq!(
            classify_format("https://cdn.example.com/x/file.pdf#page=2"),
            FormatGroup::Pdf
        );
        assert_eq!(classify_format("folder/sub/file.eps"), FormatGroup::Eps);
        assert_eq!(classify_format("my logo final.png"), FormatGroup::PngJpg);
    }

    #[test]
    fn test_classify_asset_falls_back_to_url() {
        let mut a = asset("1", "Primary logo", AssetCategory::Logo);
        a.url = "https://cdn.example.com/assets/brand-1/1700000000-abc.eps".to_string();
        assert_eq!(classify_asset(&a), FormatGroup::Eps);

        a.name = "Brand Logo v1.2".to_string();
        a.url = "https://cdn.example.com/assets/brand-1/1700000000-abc.png".to_string();
        assert_eq!(classify_asset(&a), FormatGroup::PngJpg);

        // a recognised name wins over the url
        a.name = "mark.ai".to_string();
        assert_eq!(classify_asset(&a), FormatGroup::Ai);

        a.name = "Primary logo.svg".to_string();
        a.url = "https://cdn.example.com/assets/brand-1/1700000000-abc.svg".to_string();
        assert_eq!(classify_asset(&a), FormatGroup::Other);
    }

    #[test]
    fn test_group_omits_empty_buckets() {
        let assets = vec![
            asset("1", "a.png", AssetCategory::Logo),
            asset("2", "b.PNG", AssetCategory::Logo),
            asset("3", "c.svg", AssetCategory::Logo),
        ];

        let folders = group_by_format(&assets);
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].format, FormatGroup::PngJpg);
        assert_eq!(folders[0].name, "PNG/JPG");
        assert_eq!(folders[0].assets.len(), 2);
        assert_eq!(folders[1].format, FormatGroup::Other);
        assert_eq!(folders[1].assets.len(), 1);
    }

    #[test]
    fn test_group_order_is_fixed_and_stable() {
        let assets = vec![
            asset("1", "z.svg", AssetCategory::Logo),
            asset("2", "second.png", AssetCategory::Logo),
            asset("3", "mark.ai", AssetCategory::Logo),
            asset("4", "first.jpg", AssetCategory::Logo),
            asset("5", "guide.pdf", AssetCategory::Logo),
        ];

        let folders = group_by_format(&assets);
        let formats: Vec<FormatGroup> = folders.iter().map(|f| f.format).collect();
        assert_eq!(
            formats,
            vec![
                FormatGroup::Ai,
                FormatGroup::Pdf,
                FormatGroup::PngJpg,
                FormatGroup::Other
            ]
        );

        let png_ids: Vec<&str> = folders[2].assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(png_ids, vec!["2", "4"]);
    }

    #[test]
    fn test_group_only_considers_logo_category() {
        let assets = vec![
            asset("1", "font.pdf", AssetCategory::Typography),
            asset("2", "hero.jpg", AssetCategory::Imagery),
            asset("3", "misc.ai", AssetCategory::Other),
            asset("4", "logo.ai", AssetCategory::Logo),
        ];

        let folders = group_by_format(&assets);
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].format, FormatGroup::Ai);
        assert_eq!(folders[0].assets[0].id, "4");

        assert!(group_by_format(&[]).is_empty());
    }
}
