use super::colors::HexColor;

/// Identity of one selected logo. Results are matched to the logo that
/// triggered them by key, not by arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogoKey(u64);

/// Suggested swatches for the logo currently shown in a brand form
#[derive(Debug, Default)]
pub struct PaletteSuggestions {
    next_key: u64,
    current: Option<LogoKey>,
    swatches: Vec<HexColor>,
}

impl PaletteSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new logo was selected. Returns the key its extraction result must
    /// carry; anything issued earlier is stale from now on.
    pub fn select_logo(&mut self) -> LogoKey {
        self.next_key += 1;
        let key = LogoKey(self.next_key);
        self.current = Some(key);
        self.swatches.clear();
        key
    }

    /// The logo was removed from the form
    pub fn clear_logo(&mut self) {
        self.current = None;
        self.swatches.clear();
    }

    pub fn current(&self) -> Option<LogoKey> {
        self.current
    }

    /// Install an extraction result if it belongs to the current logo.
    /// Returns `false` for stale results, which are dropped.
    pub fn apply(&mut self, key: LogoKey, colors: Vec<HexColor>) -> bool {
        if self.current != Some(key) {
            tracing::debug!("Discarding stale palette result {:?}", key);
            return false;
        }
        self.swatches = colors;
        true
    }

    pub fn swatches(&self) -> &[HexColor] {
        &self.swatches
    }

    /// Remove a swatch from the suggestions, e.g. after it was promoted
    pub fn take_swatch(&mut self, hex: &HexColor) -> Option<HexColor> {
        let index = self.swatches.iter().position(|s| s == hex)?;
        Some(self.swatches.remove(index))
    }
}
