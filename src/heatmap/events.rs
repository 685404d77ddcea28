//! Interaction events and the transition function
//!
//! Every control of the chart is an event. `dispatch` is pure: it returns the
//! next state and whether the chart needs a redraw. `HeatmapController` keeps
//! a context and the current state together for callers that hold a chart
//! across many events.

use super::legend::LegendHandle;
use super::tooltip::{self, Tooltip};
use super::view_state::{ChartContext, PixelRect, RegionFilter, ViewState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChartEvent {
    /// Region dropdown changed
    RegionFilterChanged { filter: RegionFilter },
    /// Reset-filter button
    ResetFilters,
    /// Brush drag started
    BrushStarted,
    /// Brush drag ended; no selection when the brush was cleared
    BrushEnded {
        #[serde(default)]
        selection: Option<PixelRect>,
    },
    /// Wheel over the plot, pointer in plot coordinates
    Wheel { x: f64, y: f64, delta_y: f64 },
    /// Double click on the plot
    DoubleClick,
    /// Reset-zoom button
    ResetZoom,
    /// Color minimum input
    ColorMinInput { value: f64 },
    /// Color maximum input
    ColorMaxInput { value: f64 },
    SetColorRange { min: f64, max: f64 },
    /// Reset-color button
    ResetColorRange,
    /// Legend handle dragged to `y` (SVG coordinates)
    LegendHandleDragged { handle: LegendHandle, y: f64 },
    ResetLegendHandles,
}

impl ChartEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ChartEvent::RegionFilterChanged { .. } => "regionFilterChanged",
            ChartEvent::ResetFilters => "resetFilters",
            ChartEvent::BrushStarted => "brushStarted",
            ChartEvent::BrushEnded { .. } => "brushEnded",
            ChartEvent::Wheel { .. } => "wheel",
            ChartEvent::DoubleClick => "doubleClick",
            ChartEvent::ResetZoom => "resetZoom",
            ChartEvent::ColorMinInput { .. } => "colorMinInput",
            ChartEvent::ColorMaxInput { .. } => "colorMaxInput",
            ChartEvent::SetColorRange { .. } => "setColorRange",
            ChartEvent::ResetColorRange => "resetColorRange",
            ChartEvent::LegendHandleDragged { .. } => "legendHandleDragged",
            ChartEvent::ResetLegendHandles => "resetLegendHandles",
        }
    }
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ViewState,
    /// The chart must be redrawn
    pub dirty: bool,
}

/// Apply an event to a state
pub fn dispatch(ctx: &ChartContext, state: &ViewState, event: &ChartEvent) -> Transition {
    let mut next = state.clone();

    match event {
        ChartEvent::RegionFilterChanged { filter } => {
            ctx.apply_region_filter(&mut next, *filter);
        }
        ChartEvent::ResetFilters => {
            ctx.reset_filters(&mut next);
        }
        ChartEvent::BrushStarted => {
            ctx.brush_start(&mut next);
        }
        ChartEvent::BrushEnded { selection } => {
            ctx.brush_zoom(&mut next, *selection);
        }
        ChartEvent::Wheel { x, y, delta_y } => {
            ctx.wheel_zoom(&mut next, *x, *y, *delta_y);
        }
        ChartEvent::DoubleClick | ChartEvent::ResetZoom => {
            ctx.reset_zoom(&mut next);
        }
        ChartEvent::ColorMinInput { value } => {
            ctx.set_color_min(&mut next, *value);
        }
        ChartEvent::ColorMaxInput { value } => {
            ctx.set_color_max(&mut next, *value);
        }
        ChartEvent::SetColorRange { min, max } => {
            ctx.set_color_range(&mut next, *min, *max);
        }
        ChartEvent::ResetColorRange => {
            ctx.reset_color_range(&mut next);
        }
        ChartEvent::LegendHandleDragged { handle, y } => {
            ctx.drag_legend_handle(&mut next, *handle, *y);
        }
        ChartEvent::ResetLegendHandles => {
            ctx.reset_legend_handles(&mut next);
        }
    }

    let dirty = !next.renders_same(state);
    log::debug!("{} -> dirty={}", event.name(), dirty);
    Transition { state: next, dirty }
}

/// A chart's context plus its current state
#[derive(Debug, Clone)]
pub struct HeatmapController {
    ctx: ChartContext,
    state: ViewState,
}

impl HeatmapController {
    pub fn new(ctx: ChartContext) -> Self {
        let state = ctx.initial_state();
        Self { ctx, state }
    }

    pub fn context(&self) -> &ChartContext {
        &self.ctx
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Apply an event, returning whether a redraw is needed
    pub fn handle(&mut self, event: &ChartEvent) -> bool {
        let Transition { state, dirty } = dispatch(&self.ctx, &self.state, event);
        self.state = state;
        dirty
    }

    pub fn apply_region_filter(&mut self, filter: RegionFilter) -> bool {
        self.handle(&ChartEvent::RegionFilterChanged { filter })
    }

    pub fn reset_filters(&mut self) -> bool {
        self.handle(&ChartEvent::ResetFilters)
    }

    pub fn brush_start(&mut self) -> bool {
        self.handle(&ChartEvent::BrushStarted)
    }

    pub fn brush_zoom(&mut self, selection: Option<PixelRect>) -> bool {
        self.handle(&ChartEvent::BrushEnded { selection })
    }

    pub fn wheel_zoom(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.handle(&ChartEvent::Wheel { x, y, delta_y })
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.handle(&ChartEvent::ResetZoom)
    }

    pub fn set_color_range(&mut self, min: f64, max: f64) -> bool {
        self.handle(&ChartEvent::SetColorRange { min, max })
    }

    pub fn set_color_min(&mut self, value: f64) -> bool {
        self.handle(&ChartEvent::ColorMinInput { value })
    }

    pub fn set_color_max(&mut self, value: f64) -> bool {
        self.handle(&ChartEvent::ColorMaxInput { value })
    }

    pub fn reset_color_range(&mut self) -> bool {
        self.handle(&ChartEvent::ResetColorRange)
    }

    pub fn drag_legend_handle(&mut self, handle: LegendHandle, y: f64) -> bool {
        self.handle(&ChartEvent::LegendHandleDragged { handle, y })
    }

    pub fn reset_legend_handles(&mut self) -> bool {
        self.handle(&ChartEvent::ResetLegendHandles)
    }

    /// Tooltip for a pointer at plot coordinates (hovering never changes state)
    pub fn tooltip(&self, x: f64, y: f64) -> Option<Tooltip> {
        tooltip::resolve(&self.ctx, &self.state, x, y)
    }
}

/// Parse an event script: a JSON array of events
pub fn parse_script(json: &str) -> serde_json::Result<Vec<ChartEvent>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::heatmap::chart_properties::ChartPropertyReader;
    use crate::heatmap::data::{Cell, GridDataset};

    /// Decades 1950..=2040, longitudes -180..=180 every 30°
    fn dataset() -> GridDataset {
        let mut cells = Vec::new();
        for decade in (1950..=2040).step_by(10) {
            for lon in (-180..=150).step_by(30) {
                let value = (decade - 1990) as f64 / 20.0 + lon as f64 / 360.0;
                cells.push(Cell::new(decade, lon, value));
            }
        }
        GridDataset::from_cells(cells).unwrap()
    }

    fn controller_with(props: &ChartPropertyReader) -> HeatmapController {
        let ctx = ChartContext::new(dataset(), ChartConfig::from_properties(props)).unwrap();
        HeatmapController::new(ctx)
    }

    fn controller() -> HeatmapController {
        controller_with(&ChartPropertyReader::new())
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        let state = c.state();
        assert_eq!(state.current_decades.len(), 10);
        assert_eq!(state.current_longitudes.len(), 13);
        assert_eq!(state.current_longitudes.last(), Some(&180));
        assert!(!state.is_zoomed());
        assert!(!state.is_filtered());
    }

    #[test]
    fn test_region_filter_resets_zoom() {
        let mut c = controller();
        assert!(c.wheel_zoom(400.0, 200.0, -500.0));
        assert!(c.state().is_zoomed());

        assert!(c.apply_region_filter(RegionFilter::Range { lo: 0, hi: 90 }));
        let state = c.state();
        assert_eq!(state.current_longitudes, vec![0, 30, 60, 90]);
        assert_eq!(state.filtered_longitudes, vec![0, 30, 60, 90]);
        assert_eq!(state.current_decades.len(), 10);
        assert!(!state.is_zoomed());
    }

    #[test]
    fn test_region_filter_not_offered_is_noop() {
        let mut c = controller();
        let before = c.state().clone();
        assert!(!c.apply_region_filter(RegionFilter::Range { lo: -90, hi: 0 }));
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn test_region_filter_without_cells_is_noop() {
        let mut props = ChartPropertyReader::new();
        props.set("region.filters", "all,500-600");
        let mut c = controller_with(&props);
        let before = c.state().clone();
        assert!(!c.apply_region_filter(RegionFilter::Range { lo: 500, hi: 600 }));
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn test_brush_zoom_selects_overlapping_bands() {
        let mut c = controller();
        // 13 longitude bands over 830 px, 10 decade bands over 440 px
        let band_x = 830.0 / 13.0;
        let selection = PixelRect::new(band_x * 2.5, 0.0, band_x * 4.5, 88.0);
        c.brush_start();
        assert!(c.brush_zoom(Some(selection)));

        let state = c.state();
        assert_eq!(state.current_longitudes, vec![-120, -90, -60]);
        assert_eq!(state.current_decades, vec![2020, 2030, 2040]);
        assert!(!state.brush_active);
    }

    #[test]
    fn test_small_brush_is_noop() {
        let mut c = controller();
        let before = c.state().clone();
        assert!(!c.brush_zoom(Some(PixelRect::new(100.0, 100.0, 109.0, 300.0))));
        assert!(!c.brush_zoom(Some(PixelRect::new(100.0, 100.0, 300.0, 105.0))));
        assert!(!c.brush_zoom(None));
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn test_wheel_ignored_while_brushing() {
        let mut c = controller();
        c.brush_start();
        assert!(!c.wheel_zoom(400.0, 200.0, -500.0));
        assert!(!c.state().is_zoomed());
    }

    #[test]
    fn test_wheel_zoom_in_and_out() {
        let mut c = controller();
        // exp(0.5) ≈ 1.65: 13 / 1.65 ≈ 8 longitudes, 10 / 1.65 ≈ 6 decades
        assert!(c.wheel_zoom(415.0, 220.0, -500.0));
        assert_eq!(c.state().current_longitudes.len(), 8);
        assert_eq!(c.state().current_decades.len(), 6);
        assert!(c.state().current_longitudes.contains(&0));

        // Zooming far out stops at the full axes
        c.wheel_zoom(415.0, 220.0, 10_000.0);
        assert!(!c.state().is_zoomed());

        // Zooming far in stops at two entries
        c.wheel_zoom(415.0, 220.0, -10_000.0);
        assert_eq!(c.state().current_longitudes.len(), 2);
        assert_eq!(c.state().current_decades.len(), 2);
    }

    #[test]
    fn test_double_click_resets_zoom() {
        let mut c = controller();
        c.wheel_zoom(415.0, 220.0, -500.0);
        assert!(c.handle(&ChartEvent::DoubleClick));
        assert!(!c.state().is_zoomed());
        assert!(!c.handle(&ChartEvent::DoubleClick));
    }

    #[test]
    fn test_reset_filters_restores_initial_domain() {
        let mut c = controller();
        let initial = c.state().clone();
        c.apply_region_filter(RegionFilter::Range { lo: 90, hi: 180 });
        c.wheel_zoom(100.0, 100.0, -300.0);
        c.reset_zoom();
        assert!(c.reset_filters());
        assert_eq!(c.state(), &initial);
    }

    #[test]
    fn test_set_color_range_keeps_order() {
        let mut c = controller();
        c.set_color_range(-1.0, 1.0);
        assert!(c.set_color_range(2.0, 1.0));
        let color = c.state().color;
        assert!(color.min < color.max);

        assert!(c.reset_color_range());
        assert_eq!(c.state().color.min, -c.state().color.limit);
    }

    #[test]
    fn test_legend_handles_disabled_by_default() {
        let mut c = controller();
        assert!(!c.drag_legend_handle(LegendHandle::Top, 100.0));
        assert_eq!(c.state().legend_window, None);
    }

    #[test]
    fn test_legend_handles_dim_cells() {
        let mut props = ChartPropertyReader::new();
        props.set("legend.handles", "true");
        let mut c = controller_with(&props);

        // Top handle to the middle of the bar (value 0)
        assert!(c.drag_legend_handle(LegendHandle::Top, 20.0 + 220.0));
        let window = c.state().legend_window.unwrap();
        assert!(window.top.abs() < 1e-9);
        assert_eq!(window.bottom, c.state().color.min);

        let ctx = c.context();
        assert_eq!(ctx.cell_opacity(c.state(), -0.5), 1.0);
        assert_eq!(ctx.cell_opacity(c.state(), 0.5), 0.25);

        // Bottom handle cannot pass the top one
        c.drag_legend_handle(LegendHandle::Bottom, 20.0);
        let window = c.state().legend_window.unwrap();
        assert_eq!(window.bottom, window.top);

        assert!(c.reset_legend_handles());
        assert_eq!(c.context().cell_opacity(c.state(), 0.5), 1.0);
    }

    #[test]
    fn test_parse_script() {
        let events = parse_script(
            r#"[
                {"type": "regionFilterChanged", "filter": "0-90"},
                {"type": "brushStarted"},
                {"type": "brushEnded", "selection": {"x0": 0, "y0": 0, "x1": 100, "y1": 100}},
                {"type": "brushEnded"},
                {"type": "wheel", "x": 10, "y": 20, "deltaY": -120},
                {"type": "setColorRange", "min": -1, "max": 1},
                {"type": "legendHandleDragged", "handle": "top", "y": 40}
            ]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(
            events[0],
            ChartEvent::RegionFilterChanged {
                filter: RegionFilter::Range { lo: 0, hi: 90 }
            }
        );
        assert_eq!(events[3], ChartEvent::BrushEnded { selection: None });
        assert_eq!(
            events[4],
            ChartEvent::Wheel {
                x: 10.0,
                y: 20.0,
                delta_y: -120.0
            }
        );
        assert!(parse_script(r#"[{"type": "regionFilterChanged", "filter": "x"}]"#).is_err());
        assert!(parse_script(r#"[{"type": "wheel", "x": 1, "y": 2, "delta_y": -1}]"#).is_err());

        let json = serde_json::to_string(&events[4]).unwrap();
        assert!(json.contains(r#""deltaY":-120"#));
    }

    #[test]
    fn test_dispatch_is_pure() {
        let c = controller();
        let state = c.state().clone();
        let t = dispatch(c.context(), &state, &ChartEvent::Wheel {
            x: 415.0,
            y: 220.0,
            delta_y: -500.0,
        });
        assert!(t.dirty);
        assert_ne!(t.state, state);
        assert_eq!(c.state(), &state);
    }
}
