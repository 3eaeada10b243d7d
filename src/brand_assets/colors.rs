use super::BrandColor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static HEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#?[0-9a-f]{6}$").expect("valid hex color pattern"));

/// Field-level problems with a manually entered color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a hex color")]
    EmptyInput,
    #[error("Invalid hex color. Use format #RRGGBB or RRGGBB")]
    InvalidFormat,
    #[error("This color is already in the palette")]
    DuplicateColor,
}

/// Six-digit hex color, always `#RRGGBB` in upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        if !HEX_PATTERN.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat);
        }

        let digits = trimmed.trim_start_matches('#').to_ascii_uppercase();
        Ok(HexColor(format!("#{}", digits)))
    }

    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        HexColor(format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against a stored hex value
    pub fn matches(&self, stored: &str) -> bool {
        let stored = stored.trim();
        let stored = stored.strip_prefix('#').unwrap_or(stored);
        self.0[1..].eq_ignore_ascii_case(stored)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

/// Outcome of promoting a suggested swatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
    Added(Vec<BrandColor>),
    Unchanged,
}

fn contains_hex(existing: &[BrandColor], hex: &HexColor) -> bool {
    existing.iter().any(|color| hex.matches(&color.hex))
}

fn new_brand_color(hex: &HexColor) -> BrandColor {
    BrandColor {
        id: format!("color-{}", uuid::Uuid::new_v4()),
        name: hex.to_string(),
        hex: hex.to_string(),
    }
}

/// Add a suggested swatch to the brand colors unless it is already there.
/// Duplicates are not an error, the list is simply left alone.
pub fn promote_swatch(hex: &HexColor, existing: &[BrandColor]) -> Promotion {
    if contains_hex(existing, hex) {
        tracing::debug!("Swatch {} already in palette, ignoring", hex);
        return Promotion::Unchanged;
    }

    let mut colors = existing.to_vec();
    colors.push(new_brand_color(hex));
    Promotion::Added(colors)
}

/// Validate a typed hex code and append it to the brand colors
pub fn validate_and_add_manual_color(
    input: &str,
    existing: &[BrandColor],
) -> Result<Vec<BrandColor>, ValidationError> {
    let hex = HexColor::parse(input)?;
    if contains_hex(existing, &hex) {
        return Err(ValidationError::DuplicateColor);
    }

    let mut colors = existing.to_vec();
    colors.push(new_brand_color(&hex));
    Ok(colors)
}

/// Remove a color by id. Re-adding the same hex later creates a new entry.
pub fn remove_color(id: &str, existing: &[BrandColor]) -> Vec<BrandColor> {
    existing
        .iter()
        .filter(|color| color.id != id)
        .cloned()
        .collect()
}

/// Parse the `colors` form field. Anything that is not a JSON array yields
/// an empty list; malformed entries inside the array are skipped.
pub fn parse_colors_json(raw: Option<&str>) -> Vec<BrandColor> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Error parsing colors: {}", e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<BrandColor>(entry) {
            Ok(color) => Some(color),
            Err(e) => {
                tracing::warn!("Skipping color entry {}: {}", i, e);
                None
            }
        })
        .collect()
}

/// Parse the `fonts` form field, a JSON array of font family names
pub fn parse_fonts_json(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(fonts) => fonts,
        Err(e) => {
            tracing::warn!("Error parsing fonts: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(hex: &str) -> BrandColor {
        BrandColor {
            id: format!("color-{}", hex),
            name: hex.to_string(),
            hex: hex.to_string(),
        }
    }

    #[test]
    fn test_hex_parse_normalizes() {
        assert_eq!(HexColor::parse("ff5733").unwrap().as_str(), "#FF5733");
        assert_eq!(HexColor::parse("  #a1b2c3 ").unwrap().as_str(), "#A1B2C3");
        assert_eq!(HexColor::from_rgb([255, 0, 10]).as_str(), "#FF000A");
    }

    #[test]
    fn test_hex_parse_rejects_bad_input() {
        assert_eq!(HexColor::parse("   "), Err(ValidationError::EmptyInput));
        assert_eq!(HexColor::parse("zzzzzz"), Err(ValidationError::InvalidFormat));
        assert_eq!(HexColor::parse("#fff"), Err(ValidationError::InvalidFormat));
        assert_eq!(HexColor::parse("##ff5733"), Err(ValidationError::InvalidFormat));
        assert_eq!(HexColor::parse("ff57331"), Err(ValidationError::InvalidFormat));
    }

    #[test]
    fn test_manual_color_added() {
        let colors = validate_and_add_manual_color("ff5733", &[]).unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].hex, "#FF5733");
        assert_eq!(colors[0].name, "#FF5733");
        assert!(colors[0].id.starts_with("color-"));
    }

    #[test]
    fn test_manual_color_errors() {
        let existing = vec![color("#FF5733")];
        assert_eq!(
            validate_and_add_manual_color("#FF5733", &existing),
            Err(ValidationError::DuplicateColor)
        );
        assert_eq!(
            validate_and_add_manual_color("ff5733", &existing),
            Err(ValidationError::DuplicateColor)
        );
        assert_eq!(
            validate_and_add_manual_color("zzzzzz", &[]),
            Err(ValidationError::InvalidFormat)
        );
        assert_eq!(
            validate_and_add_manual_color("   ", &[]),
            Err(ValidationError::EmptyInput)
        );
    }

    #[test]
    fn test_duplicate_check_ignores_stored_case() {
        let existing = vec![color("#ff5733")];
        assert_eq!(
            validate_and_add_manual_color("FF5733", &existing),
            Err(ValidationError::DuplicateColor)
        );
    }

    #[test]
    fn test_promotion_is_idempotent() {
        let hex = HexColor::parse("#336699").unwrap();

        let Promotion::Added(once) = promote_swatch(&hex, &[]) else {
            panic!("first promotion should add the color");
        };
        assert_eq!(promote_swatch(&hex, &once), Promotion::Unchanged);
        assert_eq!(once.iter().filter(|c| c.hex == "#336699").count(), 1);
    }

    #[test]
    fn test_promotion_appends_to_end() {
        let existing = vec![color("#111111"), color("#222222")];
        let hex = HexColor::parse("333333").unwrap();
        let Promotion::Added(colors) = promote_swatch(&hex, &existing) else {
            panic!("expected a new color");
        };
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[2].hex, "#333333");
        assert_ne!(colors[2].id, colors[1].id);
    }

    #[test]
    fn test_remove_then_readd_gets_new_id() {
        let colors = validate_and_add_manual_color("#abcdef", &[]).unwrap();
        let first_id = colors[0].id.clone();

        let colors = remove_color(&first_id, &colors);
        assert!(colors.is_empty());

        let colors = validate_and_add_manual_color("#abcdef", &colors).unwrap();
        assert_ne!(colors[0].id, first_id);
    }

    #[test]
    fn test_parse_form_json_is_lenient() {
        let colors = parse_colors_json(Some(r##"[{"id":"c1","name":"Red","hex":"#FF0000"}]"##));
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].name, "Red");

        assert!(parse_colors_json(Some("{not json")).is_empty());
        assert!(parse_colors_json(Some(r#"{"id":"c1"}"#)).is_empty());
        assert!(parse_colors_json(None).is_empty());

        assert_eq!(
            parse_fonts_json(Some(r#"["Inter","Lora"]"#)),
            vec!["Inter".to_string(), "Lora".to_string()]
        );
        assert!(parse_fonts_json(Some(r#""Inter""#)).is_empty());
    }

    #[test]
    fn test_parse_colors_skips_bad_entries() {
        let colors = parse_colors_json(Some(
            r##"[
                {"id":"c1","name":"Red","hex":"#FF0000"},
                {"id":"c2","name":"No hex"},
                42,
                {"id":"c3","name":"Blue","hex":"#0000FF"}
            ]"##,
        ));

        let ids: Vec<&str> = colors.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
        assert_eq!(colors[1].hex, "#0000FF");
    }

    #[test]
    fn test_hex_serde_uses_plain_string() {
        let hex: HexColor = serde_json::from_str(r#""00ff00""#).unwrap();
        assert_eq!(hex.as_str(), "#00FF00");
        assert_eq!(serde_json::to_string(&hex).unwrap(), r##""#00FF00""##);
        assert!(serde_json::from_str::<HexColor>(r#""nope""#).is_err());
    }
}
