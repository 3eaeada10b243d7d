use super::colors::HexColor;
use crate::config::PaletteConfig;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, GenericImageView};
use kmeans_colors::get_kmeans;
use ::palette::{FromColor, Hsl, IntoColor, Lab, LinSrgb, Srgb};
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_MAX_COLORS: usize = 5;

/// Representative color found by a quantizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub rgb: [u8; 3],
    pub population: u32,
}

/// Named swatch slots in the order the quantizer filled them.
/// A slot is `None` when no color in the image suits it.
pub type Swatches = Vec<(String, Option<Swatch>)>;

/// Reduces a bitmap to a handful of named representative colors
pub trait ImageQuantizer: Send + Sync {
    fn extract_swatches(&self, image: &DynamicImage) -> Result<Swatches>;
}

/// Turn quantizer output into brand color suggestions.
///
/// Empty slots, pure black and pure white are dropped, duplicates keep
/// their first position, and at most `max_colors` are returned. A failing
/// quantizer yields no suggestions rather than an error.
pub fn extract_palette(
    quantizer: &dyn ImageQuantizer,
    image: &DynamicImage,
    max_colors: usize,
) -> Vec<HexColor> {
    let swatches = match quantizer.extract_swatches(image) {
        Ok(swatches) => swatches,
        Err(e) => {
            tracing::warn!("Palette extraction failed: {:#}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    swatches
        .into_iter()
        .filter_map(|(_, swatch)| swatch)
        .map(|swatch| HexColor::from_rgb(swatch.rgb))
        .filter(|hex| hex.as_str() != "#000000" && hex.as_str() != "#FFFFFF")
        .filter(|hex| seen.insert(hex.clone()))
        .take(max_colors)
        .collect()
}

/// Decode an encoded image (PNG, JPEG, ...) and extract its palette
pub fn extract_palette_from_bytes(
    quantizer: &dyn ImageQuantizer,
    bytes: &[u8],
    max_colors: usize,
) -> Vec<HexColor> {
    match image::load_from_memory(bytes).context("Failed to decode logo image") {
        Ok(image) => extract_palette(quantizer, &image, max_colors),
        Err(e) => {
            tracing::warn!("Palette extraction skipped: {:#}", e);
            Vec::new()
        }
    }
}

/// Extract the palette of a `data:<mime>;base64,<payload>` URL, the form
/// a browser file reader hands over
pub fn extract_palette_from_data_url(
    quantizer: &dyn ImageQuantizer,
    data_url: &str,
    max_colors: usize,
) -> Vec<HexColor> {
    match decode_data_url(data_url) {
        Ok(bytes) => extract_palette_from_bytes(quantizer, &bytes, max_colors),
        Err(e) => {
            tracing::warn!("Palette extraction skipped: {:#}", e);
            Vec::new()
        }
    }
}

pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .context("Not a data URL")?;
    let (meta, payload) = rest.split_once(',').context("Data URL has no payload")?;
    if !meta.ends_with(";base64") {
        anyhow::bail!("Data URL is not base64 encoded");
    }

    STANDARD
        .decode(payload.trim())
        .context("Failed to decode base64 payload")
}

/// Decode and quantize on the blocking pool.
///
/// Every call runs independently; callers that care about which logo a
/// result belongs to key it with `suggestions::LogoKey`.
pub async fn extract_palette_async(
    quantizer: Arc<dyn ImageQuantizer>,
    bytes: Vec<u8>,
    max_colors: usize,
) -> Vec<HexColor> {
    let task = tokio::task::spawn_blocking(move || {
        extract_palette_from_bytes(quantizer.as_ref(), &bytes, max_colors)
    });

    match task.await {
        Ok(colors) => colors,
        Err(e) => {
            tracing::warn!("Palette extraction task failed: {}", e);
            Vec::new()
        }
    }
}

/// Luma and saturation window for one named slot
struct SlotTarget {
    name: &'static str,
    min_luma: f32,
    target_luma: f32,
    max_luma: f32,
    min_saturation: f32,
    target_saturation: f32,
    max_saturation: f32,
}

const fn slot(name: &'static str, luma: (f32, f32, f32), saturation: (f32, f32, f32)) -> SlotTarget {
    SlotTarget {
        name,
        min_luma: luma.0,
        target_luma: luma.1,
        max_luma: luma.2,
        min_saturation: saturation.0,
        target_saturation: saturation.1,
        max_saturation: saturation.2,
    }
}

const NORMAL_LUMA: (f32, f32, f32) = (0.3, 0.5, 0.7);
const LIGHT_LUMA: (f32, f32, f32) = (0.55, 0.74, 1.0);
const DARK_LUMA: (f32, f32, f32) = (0.0, 0.26, 0.45);
const VIBRANT_SATURATION: (f32, f32, f32) = (0.35, 1.0, 1.0);
const MUTED_SATURATION: (f32, f32, f32) = (0.0, 0.3, 0.4);

const SLOTS: [SlotTarget; 6] = [
    slot("Vibrant", NORMAL_LUMA, VIBRANT_SATURATION),
    slot("LightVibrant", LIGHT_LUMA, VIBRANT_SATURATION),
    slot("DarkVibrant", DARK_LUMA, VIBRANT_SATURATION),
    slot("Muted", NORMAL_LUMA, MUTED_SATURATION),
    slot("LightMuted", LIGHT_LUMA, MUTED_SATURATION),
    slot("DarkMuted", DARK_LUMA, MUTED_SATURATION),
];

const WEIGHT_SATURATION: f32 = 3.0;
const WEIGHT_LUMA: f32 = 6.0;
const WEIGHT_POPULATION: f32 = 1.0;

const KMEANS_MAX_ITER: usize = 20;
const KMEANS_CONVERGE: f32 = 1e-4;
const KMEANS_SEED: u64 = 0;

/// K-means (Lab space) quantizer filling Vibrant / Muted style slots
#[derive(Debug, Clone, Default)]
pub struct KMeansQuantizer {
    config: PaletteConfig,
}

impl KMeansQuantizer {
    pub fn new(config: PaletteConfig) -> Self {
        Self { config }
    }

    /// Opaque pixels of a thumbnail of the image
    fn sample_pixels(&self, image: &DynamicImage) -> Vec<[u8; 3]> {
        let size = self.config.sample_size.max(1);
        let (width, height) = image.dimensions();
        let sampled = if width > size || height > size {
            image.thumbnail(size, size).to_rgba8()
        } else {
            image.to_rgba8()
        };

        sampled
            .pixels()
            .filter(|p| p.0[3] >= self.config.alpha_threshold)
            .map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect()
    }
}

impl ImageQuantizer for KMeansQuantizer {
    fn extract_swatches(&self, image: &DynamicImage) -> Result<Swatches> {
        let pixels = self.sample_pixels(image);
        let palette = cluster_pixels(&pixels, self.config.palette_size);

        tracing::debug!("Quantized logo into {} candidate colors", palette.len());

        Ok(select_named_swatches(&palette))
    }
}

/// Cluster pixels with k-means in Lab space and return the mean sRGB color
/// and size of every non-empty cluster.
///
/// `k` never exceeds the number of distinct colors, so flat images give
/// exact colors back.
fn cluster_pixels(pixels: &[[u8; 3]], max_clusters: usize) -> Vec<Swatch> {
    let distinct = pixels.iter().collect::<HashSet<_>>().len();
    let k = max_clusters.min(distinct).min(usize::from(u8::MAX));
    if k == 0 {
        return Vec::new();
    }

    let lab_pixels: Vec<Lab> = pixels
        .iter()
        .map(|&[r, g, b]| {
            let linear: LinSrgb = Srgb::new(r, g, b).into_format::<f32>().into_linear();
            linear.into_color()
        })
        .collect();

    let kmeans = get_kmeans(k, KMEANS_MAX_ITER, KMEANS_CONVERGE, false, &lab_pixels, KMEANS_SEED);

    let mut clusters = vec![([0u64; 3], 0u32); kmeans.centroids.len()];
    for (pixel, &index) in pixels.iter().zip(kmeans.indices.iter()) {
        let (sums, count) = &mut clusters[index as usize];
        for (sum, c) in sums.iter_mut().zip(pixel) {
            *sum += u64::from(*c);
        }
        *count += 1;
    }

    clusters
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(sums, count)| {
            let n = u64::from(count);
            Swatch {
                rgb: sums.map(|sum| ((sum + n / 2) / n) as u8),
                population: count,
            }
        })
        .collect()
}

/// HSL saturation and lightness of an RGB triple, both in `0.0..=1.0`
fn saturation_and_luma(rgb: [u8; 3]) -> (f32, f32) {
    let hsl: Hsl = Hsl::from_color(Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>());
    (hsl.saturation, hsl.lightness)
}

fn score(target: &SlotTarget, saturation: f32, luma: f32, population: u32, max_population: u32) -> f32 {
    let saturation_score = 1.0 - (saturation - target.target_saturation).abs();
    let luma_score = 1.0 - (luma - target.target_luma).abs();
    let population_score = if max_population == 0 {
        0.0
    } else {
        population as f32 / max_population as f32
    };

    (saturation_score * WEIGHT_SATURATION
        + luma_score * WEIGHT_LUMA
        + population_score * WEIGHT_POPULATION)
        / (WEIGHT_SATURATION + WEIGHT_LUMA + WEIGHT_POPULATION)
}

fn select_named_swatches(palette: &[Swatch]) -> Swatches {
    let max_population = palette.iter().map(|s| s.population).max().unwrap_or(0);
    let mut used: HashSet<[u8; 3]> = HashSet::new();

    SLOTS
        .iter()
        .map(|target| {
            let mut best: Option<(f32, Swatch)> = None;
            for swatch in palette {
                if used.contains(&swatch.rgb) {
                    continue;
                }
                let (saturation, luma) = saturation_and_luma(swatch.rgb);
                let fits = (target.min_saturation..=target.max_saturation).contains(&saturation)
                    && (target.min_luma..=target.max_luma).contains(&luma);
                if !fits {
                    continue;
                }

                let value = score(target, saturation, luma, swatch.population, max_population);
                if best.is_none_or(|(best_value, _)| value > best_value) {
                    best = Some((value, *swatch));
                }
            }

            if let Some((_, swatch)) = best {
                used.insert(swatch.rgb);
            }
            (target.name.to_string(), best.map(|(_, swatch)| swatch))
        })
        .collect()
}
