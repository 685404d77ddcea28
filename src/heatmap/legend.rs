//! Color legend geometry and drag handles
//!
//! The legend is a vertical bar right of the plot. Its positional scale maps
//! the color range onto the bar, `min` at the bottom. In the handle variant two
//! markers on the bar select a value window; cells outside it are dimmed.

use super::colors::ColorRange;
use super::scales::LinearScale;
use crate::config::Layout;
use serde::{Deserialize, Serialize};

pub const LEGEND_WIDTH: f64 = 14.0;
pub const LEGEND_OFFSET: f64 = 16.0;
pub const LEGEND_TITLE: &str = "Anomaly (°C)";

/// Bar position in SVG coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LegendGeometry {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            x: layout.margin.left + layout.inner_width() + LEGEND_OFFSET,
            y: layout.margin.top,
            width: LEGEND_WIDTH,
            height: layout.inner_height(),
        }
    }

    /// Value → bar pixel (`min` at the bottom edge)
    pub fn scale(&self, range: &ColorRange) -> LinearScale {
        LinearScale::new((range.min, range.max), (self.y + self.height, self.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendHandle {
    Top,
    Bottom,
}

/// Value window selected by the two handles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendWindow {
    pub top: f64,
    pub bottom: f64,
}

impl LegendWindow {
    pub fn full(range: &ColorRange) -> Self {
        Self {
            top: range.max,
            bottom: range.min,
        }
    }

    /// The window with both handles clamped into the color range
    pub fn clamped(&self, range: &ColorRange) -> Self {
        Self {
            top: self.top.clamp(range.min, range.max),
            bottom: self.bottom.clamp(range.min, range.max),
        }
    }

    pub fn lo(&self) -> f64 {
        self.top.min(self.bottom)
    }

    pub fn hi(&self) -> f64 {
        self.top.max(self.bottom)
    }

    /// Move one handle to `value` without letting it cross the other
    pub fn dragged(&self, handle: LegendHandle, value: f64) -> Self {
        match handle {
            LegendHandle::Top => Self {
                top: value.max(self.bottom),
                bottom: self.bottom,
            },
            LegendHandle::Bottom => Self {
                top: self.top,
                bottom: value.min(self.top),
            },
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo() && value <= self.hi()
    }
}

/// Window in effect for a color range (None = no soft filter)
pub fn effective_window(window: Option<&LegendWindow>, range: &ColorRange) -> Option<LegendWindow> {
    window.map(|w| w.clamped(range))
}

/// Whether a cell value falls outside the legend window
pub fn is_dimmed(window: Option<&LegendWindow>, range: &ColorRange, value: f64) -> bool {
    effective_window(window, range).is_some_and(|w| !w.contains(value))
}
