//! Chart configuration from chart properties
//!
//! Configuration is loaded from chart properties (defined in chart.json).
//! All default values come from chart.json; the only constants in this file
//! are the validation ranges.

use crate::heatmap::chart_properties::{registry, ChartPropertyReader};
use crate::heatmap::view_state::RegionFilter;
use serde::Serialize;
use std::path::PathBuf;

/// Plot margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    /// From `[top, right, bottom, left]`
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [top, right, bottom, left] => Some(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => None,
        }
    }
}

/// Outer size and margins of a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
}

impl Layout {
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// Whether a point in plot coordinates lies inside the plotting rectangle
    pub fn contains_inner(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x <= self.inner_width() && y >= 0.0 && y <= self.inner_height()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    /// CSV resource to load
    pub data_path: PathBuf,

    /// Value column; None = first known anomaly column
    pub value_column: Option<String>,

    /// Diverging palette name (validated against chart.json)
    pub palette: String,

    /// Region filters offered by the selector, `all` first
    pub region_filters: Vec<RegionFilter>,

    pub layout: Layout,

    /// Chart title (optional)
    pub title: Option<String>,

    /// Brush selections narrower or shorter than this are ignored (pixels)
    pub brush_min_size: f64,

    /// Wheel zoom factor is `exp(-deltaY * wheel_sensitivity)`
    pub wheel_sensitivity: f64,

    /// Fewest entries a wheel zoom leaves on an axis
    pub zoom_min_count: usize,

    /// Gap kept between color min and max
    pub color_gap: f64,

    /// Draggable legend handles (soft value filter)
    pub legend_handles: bool,

    /// Opacity of cells outside the legend window
    pub legend_dim_opacity: f64,

    /// Approximate tick count of the legend axis
    pub legend_ticks: usize,

    /// Longitude axis ticks at multiples of this step (degrees)
    pub lon_tick_step: i32,

    /// Most longitude ticks when no step multiple is visible
    pub lon_max_ticks: usize,
}

impl ChartConfig {
    /// Create config from chart properties
    ///
    /// All default values come from chart.json via ChartPropertyReader.
    pub fn from_properties(props: &ChartPropertyReader) -> Self {
        let data_path = PathBuf::from(props.get_string("data.path"));
        let value_column = props.get_optional_string("data.value.column");

        // Palette: validated enum (diverging palettes only)
        let palette = props.get_enum("color.palette");

        let region_filters = parse_region_filters(&props.get_string_list("region.filters"));

        let width = props.get_f64_in_range("chart.width", 100.0, 10_000.0);
        let height = props.get_f64_in_range("chart.height", 100.0, 10_000.0);

        // Margins: "top,right,bottom,left"
        let margin = props
            .get_f64_list("chart.margin", 4)
            .filter(|m| m.iter().all(|v| *v >= 0.0))
            .and_then(|m| Margins::from_slice(&m))
            .unwrap_or_else(default_margins);

        let mut layout = Layout {
            width,
            height,
            margin,
        };
        if layout.inner_width() <= 0.0 || layout.inner_height() <= 0.0 {
            log::warn!(
                "Margins {:?} leave no plotting area in {}x{}. Using default margins",
                margin,
                width,
                height
            );
            layout.margin = default_margins();
        }

        let title = props.get_optional_string("chart.title");

        let brush_min_size = props.get_f64_in_range("brush.min.size", 0.0, 1_000.0);
        let wheel_sensitivity = props.get_f64_in_range("wheel.sensitivity", 1e-6, 1.0);
        let zoom_min_count = props.get_count_in_range("zoom.min.count", 2, 1_000);
        let color_gap = props.get_f64_in_range("color.min.gap", 1e-6, 10.0);

        let legend_handles = props.get_bool("legend.handles");
        let legend_dim_opacity = props.get_f64_in_range("legend.dim.opacity", 0.0, 1.0);
        let legend_ticks = props.get_count_in_range("legend.ticks", 1, 50);

        let lon_tick_step = props.get_count_in_range("axis.x.tick.step", 1, 360) as i32;
        let lon_max_ticks = props.get_count_in_range("axis.x.max.ticks", 1, 100);

        Self {
            data_path,
            value_column,
            palette,
            region_filters,
            layout,
            title,
            brush_min_size,
            wheel_sensitivity,
            zoom_min_count,
            color_gap,
            legend_handles,
            legend_dim_opacity,
            legend_ticks,
            lon_tick_step,
            lon_max_ticks,
        }
    }

    /// Whether the selector offers this filter (`all` always is)
    pub fn offers_filter(&self, filter: &RegionFilter) -> bool {
        *filter == RegionFilter::All || self.region_filters.contains(filter)
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::from_properties(&ChartPropertyReader::new())
    }
}

/// Margins declared as the chart.json default
fn default_margins() -> Margins {
    registry()
        .get_default("chart.margin")
        .and_then(|s| {
            let values: Vec<f64> = s
                .split(',')
                .map(|p| p.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .ok()?;
            Margins::from_slice(&values)
        })
        .unwrap_or(Margins {
            top: 20.0,
            right: 70.0,
            bottom: 60.0,
            left: 80.0,
        })
}

/// Parse the offered filters, skipping invalid entries
fn parse_region_filters(entries: &[String]) -> Vec<RegionFilter> {
    let mut filters = vec![RegionFilter::All];
    for entry in entries {
        match entry.parse::<RegionFilter>() {
            Ok(filter) if !filters.contains(&filter) => filters.push(filter),
            Ok(_) => {}
            Err(e) => log::warn!("Ignoring region filter '{}': {}", entry, e),
        }
    }
    filters
}
