//! Hover resolution: pointer position → cell under it

use super::axis::degree_label;
use super::view_state::{ChartContext, ViewState};
use serde::Serialize;

pub const TOOLTIP_WIDTH: f64 = 190.0;
pub const TOOLTIP_HEIGHT: f64 = 46.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub decade: i32,
    pub longitude: i32,
    pub value: f64,
    pub lines: Vec<String>,
    /// Top-left corner of the tooltip box in SVG coordinates
    pub anchor: (f64, f64),
}

/// Tooltip for a pointer at plot coordinates `(x, y)`
///
/// None outside the plotting rectangle and where the grid has no cell.
pub fn resolve(ctx: &ChartContext, state: &ViewState, x: f64, y: f64) -> Option<Tooltip> {
    let layout = ctx.layout();
    if !x.is_finite() || !y.is_finite() || !layout.contains_inner(x, y) {
        return None;
    }

    let longitude = ctx.x_scale(state).clamped_value_at(x)?;
    let decade = ctx.y_scale(state).clamped_value_at(y)?;
    let value = ctx.dataset().get(decade, longitude)?;

    let lines = vec![
        format!("Decade {}", decade),
        format!("Lon {}, {:.2} °C", degree_label(longitude), value),
    ];
    let anchor = (
        (x + 10.0 + layout.margin.left).min(layout.width - TOOLTIP_WIDTH),
        layout.margin.top.max(y - 24.0 + layout.margin.top),
    );

    Some(Tooltip {
        decade,
        longitude,
        value,
        lines,
        anchor,
    })
}
