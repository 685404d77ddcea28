//! Color range handling and the diverging color scale
//!
//! `ColorRange` holds the user-adjustable `[min, max]` interval and enforces
//! `min < max` on every update. `DivergingColorScale` maps a value onto a
//! diverging palette with zero pinned to the palette midpoint.

use super::palettes::{to_hex, PaletteDefinition, FALLBACK_GRAY};
use serde::Serialize;

/// Default gap kept between the two bounds
pub const DEFAULT_COLOR_GAP: f64 = 0.1;

/// Limit used when every value is zero
pub const MIN_COLOR_LIMIT: f64 = 1e-6;

/// Number of stops in the legend gradient
pub const LEGEND_GRADIENT_STOPS: usize = 11;

/// Widest input bounds, regardless of the data
const INPUT_BOUND: f64 = 5.0;

/// Adjustable color interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorRange {
    pub min: f64,
    pub max: f64,
    /// Default symmetric half-width
    pub limit: f64,
    /// Accepted inputs for `min`
    pub min_bounds: (f64, f64),
    /// Accepted inputs for `max`
    pub max_bounds: (f64, f64),
    pub gap: f64,
}

impl ColorRange {
    /// Symmetric range `[-limit, +limit]` for a value extent
    pub fn from_extent(extent: (f64, f64), gap: f64) -> Self {
        let (data_min, data_max) = extent;
        let limit = data_min.abs().max(data_max.abs());
        let limit = if limit > 0.0 && limit.is_finite() {
            limit
        } else {
            MIN_COLOR_LIMIT
        };

        // Input bounds always contain the default range
        let min_bounds = ((-INPUT_BOUND).min(data_min.floor()).min(-limit), 0.0);
        let max_bounds = (0.0, INPUT_BOUND.max(data_max.ceil()).max(limit));

        Self {
            min: -limit,
            max: limit,
            limit,
            min_bounds,
            max_bounds,
            gap: if gap > 0.0 { gap } else { DEFAULT_COLOR_GAP },
        }
    }

    /// Set the lower bound; a value at or above `max` becomes `max - gap`
    ///
    /// Returns whether the range changed. Non-finite inputs are ignored.
    pub fn set_min(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let mut v = value.clamp(self.min_bounds.0, self.min_bounds.1);
        if v >= self.max {
            v = self.max - self.gap;
        }
        let changed = v != self.min;
        self.min = v;
        changed
    }

    /// Set the upper bound; a value at or below `min` becomes `min + gap`
    pub fn set_max(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let mut v = value.clamp(self.max_bounds.0, self.max_bounds.1);
        if v <= self.min {
            v = self.min + self.gap;
        }
        let changed = v != self.max;
        self.max = v;
        changed
    }

    /// Set both bounds, upper first
    pub fn set_range(&mut self, min: f64, max: f64) -> bool {
        let max_changed = self.set_max(max);
        let min_changed = self.set_min(min);
        max_changed || min_changed
    }

    /// Restore `[-limit, +limit]`
    pub fn reset(&mut self) -> bool {
        let changed = self.min != -self.limit || self.max != self.limit;
        self.min = -self.limit;
        self.max = self.limit;
        changed
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Diverging value → color mapping anchored at zero
///
/// `max` maps to the first palette color, zero to the midpoint and `min` to
/// the last color.
#[derive(Debug, Clone, Copy)]
pub struct DivergingColorScale<'a> {
    min: f64,
    max: f64,
    palette: &'a PaletteDefinition,
}

impl<'a> DivergingColorScale<'a> {
    pub fn new(range: &ColorRange, palette: &'a PaletteDefinition) -> Self {
        Self {
            min: range.min,
            max: range.max,
            palette,
        }
    }

    /// Palette position for a value in [0, 1]
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.5;
        }
        let (x0, x1, x2) = (self.max, 0.0, self.min);
        let k10 = if x0 == x1 { 0.0 } else { 0.5 / (x1 - x0) };
        let k21 = if x1 == x2 { 0.0 } else { 0.5 / (x2 - x1) };
        let s = if x1 < x0 { -1.0 } else { 1.0 };
        let k = if s * value < s * x1 { k10 } else { k21 };
        (0.5 + (value - x1) * k).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> [u8; 3] {
        if value.is_nan() {
            return FALLBACK_GRAY;
        }
        self.palette.interpolate(self.normalize(value))
    }

    pub fn color_hex(&self, value: f64) -> String {
        to_hex(self.color(value))
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// A stop of the vertical legend gradient
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// 0 at the bottom of the bar, 1 at the top
    pub offset: f64,
    pub value: f64,
    pub color: String,
}

/// Evenly spaced gradient stops from `min` (bottom) to `max` (top)
pub fn legend_gradient(scale: &DivergingColorScale) -> Vec<GradientStop> {
    let (min, max) = scale.domain();
    let last = (LEGEND_GRADIENT_STOPS - 1) as f64;
    (0..LEGEND_GRADIENT_STOPS)
        .map(|i| {
            let offset = i as f64 / last;
            let value = min + (max - min) * offset;
            GradientStop {
                offset,
                value,
                color: scale.color_hex(value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::palettes::PALETTE_REGISTRY;

    fn unit_range() -> ColorRange {
        ColorRange::from_extent((-1.0, 1.0), DEFAULT_COLOR_GAP)
    }

    #[test]
    fn test_from_extent_is_symmetric() {
        let range = ColorRange::from_extent((-0.4, 1.7), 0.1);
        assert_eq!(range.limit, 1.7);
        assert_eq!((range.min, range.max), (-1.7, 1.7));
        assert_eq!(range.min_bounds, (-5.0, 0.0));
        assert_eq!(range.max_bounds, (0.0, 5.0));

        let wide = ColorRange::from_extent((-7.2, 2.0), 0.1);
        assert_eq!(wide.min_bounds, (-8.0, 0.0));
        assert_eq!(wide.max_bounds, (0.0, 7.2));
    }

    #[test]
    fn test_all_zero_extent_uses_minimum_limit() {
        let range = ColorRange::from_extent((0.0, 0.0), 0.1);
        assert_eq!(range.limit, MIN_COLOR_LIMIT);
        assert!(range.min < range.max);
    }

    #[test]
    fn test_set_range_inverted_inputs_keep_order() {
        let mut range = unit_range();
        assert!(range.set_range(2.0, 1.0));
        assert!(range.min < range.max);
        assert_eq!((range.min, range.max), (0.0, 1.0));
    }

    #[test]
    fn test_set_min_above_max_uses_gap() {
        let mut range = unit_range();
        range.set_max(0.0);
        range.set_min(0.0);
        assert_eq!(range.max, 0.0);
        assert!((range.min - -0.1).abs() < 1e-12);
    }

    #[test]
    fn test_set_max_below_min_uses_gap() {
        let mut range = unit_range();
        range.set_min(0.0);
        range.set_max(-3.0);
        assert_eq!(range.min, 0.0);
        assert!((range.max - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_inputs_clamped_to_bounds_and_nan_ignored() {
        let mut range = unit_range();
        range.set_min(-50.0);
        assert_eq!(range.min, -5.0);
        assert!(!range.set_max(f64::NAN));
        assert_eq!(range.max, 1.0);
    }

    #[test]
    fn test_reset() {
        let mut range = unit_range();
        range.set_range(-0.5, 0.5);
        assert!(range.reset());
        assert_eq!((range.min, range.max), (-1.0, 1.0));
        assert!(!range.reset());
    }

    #[test]
    fn test_diverging_scale_anchored_at_zero() {
        let palette = PALETTE_REGISTRY.get("RdBu").unwrap();
        let range = ColorRange::from_extent((-2.0, 1.0), 0.1);
        let scale = DivergingColorScale::new(&range, palette);

        assert_eq!(scale.normalize(2.0), 0.0);
        assert_eq!(scale.normalize(0.0), 0.5);
        assert_eq!(scale.normalize(-2.0), 1.0);
        assert_eq!(scale.normalize(1.0), 0.25);
        assert_eq!(scale.normalize(99.0), 0.0);

        assert_eq!(scale.color_hex(0.0), "#f7f7f7");
        assert_eq!(scale.color_hex(2.0), "#67001f");
        assert_eq!(scale.color_hex(-2.0), "#053061");
    }

    #[test]
    fn test_asymmetric_range_keeps_zero_neutral() {
        let palette = PALETTE_REGISTRY.get("RdBu").unwrap();
        let mut range = unit_range();
        range.set_range(-0.5, 1.0);
        let scale = DivergingColorScale::new(&range, palette);
        assert_eq!(scale.normalize(0.0), 0.5);
        assert_eq!(scale.normalize(-0.5), 1.0);
        assert_eq!(scale.normalize(-0.25), 0.75);
    }

    #[test]
    fn test_legend_gradient() {
        let palette = PALETTE_REGISTRY.get("RdBu").unwrap();
        let range = unit_range();
        let stops = legend_gradient(&DivergingColorScale::new(&range, palette));
        assert_eq!(stops.len(), LEGEND_GRADIENT_STOPS);
        assert_eq!(stops[0].value, -1.0);
        assert_eq!(stops[0].color, "#053061");
        assert_eq!(stops[10].value, 1.0);
        assert_eq!(stops[10].color, "#67001f");
        assert_eq!(stops[5].color, "#f7f7f7");
    }
}
