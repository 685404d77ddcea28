//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name. Every palette is diverging: the first color is the warm end,
//! the middle color is the neutral midpoint.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        log::error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Default diverging palette name
pub const DEFAULT_DIVERGING_PALETTE: &str = "RdBu";

/// Neutral gray used when a palette cannot provide a color
pub const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index (clamped to the last color)
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        if self.colors.is_empty() {
            return FALLBACK_GRAY;
        }
        let idx = index.min(self.colors.len() - 1);
        parse_hex_color(&self.colors[idx]).unwrap_or(FALLBACK_GRAY)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Interpolate a color from the palette at position t ∈ [0, 1]
    ///
    /// t=0 returns the first color, t=1 returns the last color.
    /// Values in between are linearly interpolated.
    pub fn interpolate(&self, t: f64) -> [u8; 3] {
        if self.colors.is_empty() {
            return FALLBACK_GRAY;
        }

        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let n = self.colors.len();

        if n == 1 {
            return self.get_color(0);
        }

        let pos = t * (n - 1) as f64;
        let idx_low = pos.floor() as usize;
        let idx_high = (idx_low + 1).min(n - 1);
        let frac = pos - idx_low as f64;

        let color_low = self.get_color(idx_low);
        let color_high = self.get_color(idx_high);

        [
            (color_low[0] as f64 * (1.0 - frac) + color_high[0] as f64 * frac).round() as u8,
            (color_low[1] as f64 * (1.0 - frac) + color_high[1] as f64 * frac).round() as u8,
            (color_low[2] as f64 * (1.0 - frac) + color_high[2] as f64 * frac).round() as u8,
        ]
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            registry.palettes.insert(def.name.to_lowercase(), def);
        }

        log::debug!("PaletteRegistry: loaded {} palettes", registry.palettes.len());

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    pub fn default_diverging(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_DIVERGING_PALETTE)
    }
}

/// Parse a hex color string to RGB array
///
/// Supports `#RRGGBB`, `#RRGGBBAA` (alpha ignored) and both without `#`.
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        log::warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}

/// Format RGB as `#rrggbb`
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
