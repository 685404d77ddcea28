//! View state and the operations that change it
//!
//! `ViewState` is the only mutable part of a chart: the visible decade and
//! longitude windows, the active region filter, the color range and the legend
//! window. `ChartContext` holds everything that stays fixed after loading
//! (dataset, configuration, palette) and implements the operations. Each
//! operation either applies completely or leaves the state untouched and
//! returns false.
//!
//! Pointer coordinates are relative to the plotting rectangle (origin at its
//! top-left corner). Legend handle positions are SVG coordinates.

use super::colors::{ColorRange, DivergingColorScale};
use super::data::{Cell, GridDataset};
use super::error::{HeatmapError, Result};
use super::legend::{self, LegendGeometry, LegendHandle, LegendWindow};
use super::palettes::{PaletteDefinition, PALETTE_REGISTRY};
use super::scales::BandScale;
use crate::config::{ChartConfig, Layout};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longitude restriction selected in the region dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RegionFilter {
    #[default]
    All,
    /// Inclusive longitude range
    Range { lo: i32, hi: i32 },
}

impl RegionFilter {
    pub fn contains(&self, longitude: i32) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Range { lo, hi } => (*lo..=*hi).contains(&longitude),
        }
    }
}

impl FromStr for RegionFilter {
    type Err = String;

    /// `all`, or `<lo>-<hi>` where either bound may be negative (`-180--90`)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(RegionFilter::All);
        }

        let split = s
            .char_indices()
            .filter(|&(i, c)| c == '-' && i > 0)
            .find_map(|(i, _)| {
                let lo = s[..i].trim().parse::<i32>().ok()?;
                let hi = s[i + 1..].trim().parse::<i32>().ok()?;
                Some((lo, hi))
            });

        match split {
            Some((lo, hi)) if lo <= hi => Ok(RegionFilter::Range { lo, hi }),
            Some((lo, hi)) => Err(format!("empty longitude range {}..{}", lo, hi)),
            None => Err(format!("expected 'all' or '<lo>-<hi>', got '{}'", s)),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => write!(f, "all"),
            RegionFilter::Range { lo, hi } => write!(f, "{}-{}", lo, hi),
        }
    }
}

impl TryFrom<String> for RegionFilter {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionFilter> for String {
    fn from(filter: RegionFilter) -> Self {
        filter.to_string()
    }
}

/// Brush selection in plot coordinates, corners in any order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Ordered corners, clamped to the plotting rectangle
    pub fn clamped_to(&self, layout: &Layout) -> Self {
        let (w, h) = (layout.inner_width(), layout.inner_height());
        Self {
            x0: self.x0.min(self.x1).clamp(0.0, w),
            y0: self.y0.min(self.y1).clamp(0.0, h),
            x1: self.x0.max(self.x1).clamp(0.0, w),
            y1: self.y0.max(self.y1).clamp(0.0, h),
        }
    }

    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }

    fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Everything an interaction can change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Visible decades, ascending
    pub current_decades: Vec<i32>,
    /// Visible longitudes, ascending
    pub current_longitudes: Vec<i32>,
    /// Decades of the active filter (the zoom-out limit)
    pub filtered_decades: Vec<i32>,
    /// Longitudes of the active filter
    pub filtered_longitudes: Vec<i32>,
    pub region_filter: RegionFilter,
    pub color: ColorRange,
    /// A brush drag is in progress
    pub brush_active: bool,
    /// Legend handle window; None = nothing dimmed
    pub legend_window: Option<LegendWindow>,
}

impl ViewState {
    pub fn is_zoomed(&self) -> bool {
        self.current_decades != self.filtered_decades
            || self.current_longitudes != self.filtered_longitudes
    }

    pub fn is_filtered(&self) -> bool {
        self.region_filter != RegionFilter::All
    }

    /// Whether two states render identically (the brush flag is not drawn)
    pub fn renders_same(&self, other: &ViewState) -> bool {
        self.current_decades == other.current_decades
            && self.current_longitudes == other.current_longitudes
            && self.filtered_decades == other.filtered_decades
            && self.filtered_longitudes == other.filtered_longitudes
            && self.region_filter == other.region_filter
            && self.color == other.color
            && self.legend_window == other.legend_window
    }

    fn set_domain(&mut self, decades: Vec<i32>, longitudes: Vec<i32>) -> bool {
        let changed = decades != self.current_decades || longitudes != self.current_longitudes;
        self.current_decades = decades;
        self.current_longitudes = longitudes;
        changed
    }
}

/// The fixed part of a chart: data, configuration and palette
#[derive(Debug, Clone)]
pub struct ChartContext {
    dataset: GridDataset,
    config: ChartConfig,
    palette: &'static PaletteDefinition,
    /// Instance id, keeps SVG definition ids unique across charts on one page
    chart_id: String,
}

impl ChartContext {
    pub fn new(dataset: GridDataset, config: ChartConfig) -> Result<Self> {
        let palette = PALETTE_REGISTRY
            .get(&config.palette)
            .or_else(|| PALETTE_REGISTRY.default_diverging())
            .ok_or_else(|| {
                HeatmapError::Config(format!(
                    "No diverging palette named '{}' and no default palette",
                    config.palette
                ))
            })?;

        log::debug!(
            "ChartContext: {} cells, {} decades x {} longitudes, palette {}",
            dataset.len(),
            dataset.decades().len(),
            dataset.longitudes().len(),
            palette.name
        );

        Ok(Self {
            dataset,
            config,
            palette,
            chart_id: uuid::Uuid::new_v4().simple().to_string(),
        })
    }

    pub fn chart_id(&self) -> &str {
        &self.chart_id
    }

    pub fn dataset(&self) -> &GridDataset {
        &self.dataset
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.config.layout
    }

    pub fn palette(&self) -> &'static PaletteDefinition {
        self.palette
    }

    pub fn legend_geometry(&self) -> LegendGeometry {
        LegendGeometry::from_layout(&self.config.layout)
    }

    /// Unzoomed, unfiltered state with the default color range
    pub fn initial_state(&self) -> ViewState {
        let decades = self.dataset.decades().to_vec();
        let longitudes = self.dataset.longitudes().to_vec();
        ViewState {
            current_decades: decades.clone(),
            current_longitudes: longitudes.clone(),
            filtered_decades: decades,
            filtered_longitudes: longitudes,
            region_filter: RegionFilter::All,
            color: ColorRange::from_extent(self.dataset.value_extent(), self.config.color_gap),
            brush_active: false,
            legend_window: None,
        }
    }

    /// Longitude → horizontal band over the visible longitudes
    pub fn x_scale(&self, state: &ViewState) -> BandScale {
        BandScale::new(
            state.current_longitudes.clone(),
            0.0,
            self.config.layout.inner_width(),
        )
    }

    /// Decade → vertical band over the visible decades, earliest at the bottom
    pub fn y_scale(&self, state: &ViewState) -> BandScale {
        BandScale::new(
            state.current_decades.clone(),
            self.config.layout.inner_height(),
            0.0,
        )
    }

    pub fn color_scale(&self, state: &ViewState) -> DivergingColorScale<'static> {
        DivergingColorScale::new(&state.color, self.palette)
    }

    /// Cells of the active filter inside the visible windows
    pub fn visible_cells<'a>(&'a self, state: &'a ViewState) -> impl Iterator<Item = &'a Cell> {
        self.dataset.cells().iter().filter(move |c| {
            state.region_filter.contains(c.longitude)
                && state.current_decades.binary_search(&c.decade).is_ok()
                && state.current_longitudes.binary_search(&c.longitude).is_ok()
        })
    }

    /// Fill opacity of a cell with this value
    pub fn cell_opacity(&self, state: &ViewState, value: f64) -> f64 {
        if legend::is_dimmed(state.legend_window.as_ref(), &state.color, value) {
            self.config.legend_dim_opacity
        } else {
            1.0
        }
    }

    /// Restrict the data to a longitude region and reset zoom
    ///
    /// Rejected when the filter is not offered or selects no cells.
    pub fn apply_region_filter(&self, state: &mut ViewState, filter: RegionFilter) -> bool {
        if !self.config.offers_filter(&filter) {
            log::warn!("Region filter '{}' is not offered by this chart", filter);
            return false;
        }

        let (decades, longitudes) = self.dataset.axes_where(|c| filter.contains(c.longitude));
        if decades.is_empty() || longitudes.is_empty() {
            log::warn!("Region filter '{}' selects no cells, ignoring", filter);
            return false;
        }

        let before = state.clone();
        state.region_filter = filter;
        state.filtered_decades = decades.clone();
        state.filtered_longitudes = longitudes.clone();
        state.set_domain(decades, longitudes);
        !state.renders_same(&before)
    }

    /// Back to `all`, unzoomed
    pub fn reset_filters(&self, state: &mut ViewState) -> bool {
        let filtered = self.apply_region_filter(state, RegionFilter::All);
        let unzoomed = self.reset_zoom(state);
        filtered || unzoomed
    }

    /// Zoom to the bands touched by a brush selection
    ///
    /// Ends the brush gesture whether or not the selection is applied.
    pub fn brush_zoom(&self, state: &mut ViewState, selection: Option<PixelRect>) -> bool {
        state.brush_active = false;

        let Some(rect) = selection.filter(PixelRect::is_finite) else {
            return false;
        };
        let rect = rect.clamped_to(&self.config.layout);
        let min_size = self.config.brush_min_size;
        if rect.width() < min_size || rect.height() < min_size {
            log::debug!(
                "Brush {:.1}x{:.1} below {} px, ignoring",
                rect.width(),
                rect.height(),
                min_size
            );
            return false;
        }

        let longitudes = self.x_scale(state).values_overlapping(rect.x0, rect.x1);
        let decades = self.y_scale(state).values_overlapping(rect.y0, rect.y1);
        if longitudes.is_empty() || decades.is_empty() {
            return false;
        }

        log::debug!(
            "Brush zoom to {} decades x {} longitudes",
            decades.len(),
            longitudes.len()
        );
        state.set_domain(decades, longitudes)
    }

    /// Zoom both axes around the data point under the pointer
    ///
    /// Ignored while a brush drag is in progress.
    pub fn wheel_zoom(&self, state: &mut ViewState, x: f64, y: f64, delta_y: f64) -> bool {
        if state.brush_active || !delta_y.is_finite() || !x.is_finite() || !y.is_finite() {
            return false;
        }

        let factor = (-delta_y * self.config.wheel_sensitivity).exp();

        let Some(center_lon) = self.x_scale(state).clamped_value_at(x) else {
            return false;
        };
        let Some(center_decade) = self.y_scale(state).clamped_value_at(y) else {
            return false;
        };

        let min_count = self.config.zoom_min_count;
        let longitudes = zoom_window(
            &state.filtered_longitudes,
            center_lon,
            state.current_longitudes.len(),
            factor,
            min_count,
        );
        let decades = zoom_window(
            &state.filtered_decades,
            center_decade,
            state.current_decades.len(),
            factor,
            min_count,
        );

        match (decades, longitudes) {
            (Some(decades), Some(longitudes)) => {
                log::debug!(
                    "Wheel zoom x{:.3} around ({}, {}): {} decades x {} longitudes",
                    factor,
                    center_decade,
                    center_lon,
                    decades.len(),
                    longitudes.len()
                );
                state.set_domain(decades, longitudes)
            }
            _ => false,
        }
    }

    /// Show the whole filtered domain
    pub fn reset_zoom(&self, state: &mut ViewState) -> bool {
        let decades = state.filtered_decades.clone();
        let longitudes = state.filtered_longitudes.clone();
        state.set_domain(decades, longitudes)
    }

    pub fn brush_start(&self, state: &mut ViewState) -> bool {
        state.brush_active = true;
        false
    }

    pub fn set_color_range(&self, state: &mut ViewState, min: f64, max: f64) -> bool {
        state.color.set_range(min, max)
    }

    pub fn set_color_min(&self, state: &mut ViewState, value: f64) -> bool {
        state.color.set_min(value)
    }

    pub fn set_color_max(&self, state: &mut ViewState, value: f64) -> bool {
        state.color.set_max(value)
    }

    pub fn reset_color_range(&self, state: &mut ViewState) -> bool {
        state.color.reset()
    }

    /// Move a legend handle to the value under `y` (SVG coordinates)
    ///
    /// Ignored unless the chart has legend handles.
    pub fn drag_legend_handle(&self, state: &mut ViewState, handle: LegendHandle, y: f64) -> bool {
        if !self.config.legend_handles || !y.is_finite() {
            return false;
        }

        let range = state.color;
        let value = self
            .legend_geometry()
            .scale(&range)
            .invert(y)
            .clamp(range.min, range.max);
        let window = legend::effective_window(state.legend_window.as_ref(), &range)
            .unwrap_or_else(|| LegendWindow::full(&range))
            .dragged(handle, value);

        let changed = state.legend_window != Some(window);
        state.legend_window = Some(window);
        changed
    }

    pub fn reset_legend_handles(&self, state: &mut ViewState) -> bool {
        state.legend_window.take().is_some()
    }
}

/// Window of `count` consecutive axis entries centered on `center`
///
/// `count` is `current_len / factor` rounded and clamped to
/// `[min_count, axis.len()]`; near the axis ends the window shifts inward.
fn zoom_window(
    axis: &[i32],
    center: i32,
    current_len: usize,
    factor: f64,
    min_count: usize,
) -> Option<Vec<i32>> {
    let index = axis.iter().position(|&v| v == center)?;
    let len = axis.len();
    let target = (current_len as f64 / factor).round();
    let lower = min_count.min(len) as f64;
    let count = target.clamp(lower, len as f64) as usize;
    if count == 0 {
        return None;
    }
    let start = index.saturating_sub(count / 2).min(len - count);
    Some(axis[start..start + count].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_filter_parse() {
        assert_eq!("all".parse::<RegionFilter>().unwrap(), RegionFilter::All);
        assert_eq!(
            "0-90".parse::<RegionFilter>().unwrap(),
            RegionFilter::Range { lo: 0, hi: 90 }
        );
        assert_eq!(
            "-180--90".parse::<RegionFilter>().unwrap(),
            RegionFilter::Range { lo: -180, hi: -90 }
        );
        assert_eq!(
            "-90-0".parse::<RegionFilter>().unwrap(),
            RegionFilter::Range { lo: -90, hi: 0 }
        );
        assert!("90-0".parse::<RegionFilter>().is_err());
        assert!("east".parse::<RegionFilter>().is_err());
        assert_eq!(RegionFilter::Range { lo: -180, hi: -90 }.to_string(), "-180--90");
    }

    #[test]
    fn test_region_filter_serde() {
        let filter: RegionFilter = serde_json::from_str("\"90-180\"").unwrap();
        assert_eq!(filter, RegionFilter::Range { lo: 90, hi: 180 });
        assert!(filter.contains(180));
        assert!(!filter.contains(89));
        assert_eq!(serde_json::to_string(&RegionFilter::All).unwrap(), "\"all\"");
    }

    #[test]
    fn test_pixel_rect_clamped() {
        let layout = ChartConfig::default().layout;
        let rect = PixelRect::new(900.0, 50.0, -10.0, 20.0).clamped_to(&layout);
        assert_eq!(rect, PixelRect::new(0.0, 20.0, 830.0, 50.0));
        assert_eq!(rect.width(), 830.0);
        assert_eq!(rect.height(), 30.0);
    }

    #[test]
    fn test_zoom_window() {
        let axis: Vec<i32> = (0..10).collect();
        assert_eq!(zoom_window(&axis, 5, 10, 2.0, 2), Some(vec![3, 4, 5, 6, 7]));
        // Shifted inward at the edges
        assert_eq!(zoom_window(&axis, 0, 10, 2.0, 2), Some(vec![0, 1, 2, 3, 4]));
        assert_eq!(zoom_window(&axis, 9, 10, 2.0, 2), Some(vec![5, 6, 7, 8, 9]));
        // Clamped to [min_count, len]
        assert_eq!(zoom_window(&axis, 5, 3, 100.0, 2), Some(vec![4, 5]));
        assert_eq!(zoom_window(&axis, 5, 8, 0.01, 2).map(|w| w.len()), Some(10));
        assert_eq!(zoom_window(&axis, 42, 10, 2.0, 2), None);
        assert_eq!(zoom_window(&[7], 7, 1, 2.0, 2), Some(vec![7]));
    }
}
