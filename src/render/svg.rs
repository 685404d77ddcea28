//! SVG rendering of a heatmap view
//!
//! Produces a standalone SVG document: the cell grid inside a group
//! translated by the margins, both axes, the vertical color legend and,
//! optionally, legend handles, a tooltip and a title.

use crate::heatmap::axis::{decade_ticks, degree_label, longitude_ticks};
use crate::heatmap::colors::legend_gradient;
use crate::heatmap::legend::{self, LegendHandle, LegendWindow, LEGEND_TITLE};
use crate::heatmap::scales::tick_step;
use crate::heatmap::tooltip::{Tooltip, TOOLTIP_HEIGHT, TOOLTIP_WIDTH};
use crate::heatmap::{ChartContext, ViewState};

const FONT: &str = "font-family=\"sans-serif\" font-size=\"11\"";
const TICK_SIZE: f64 = 6.0;

/// Render the chart for a view state
pub fn render_chart(ctx: &ChartContext, state: &ViewState, tooltip: Option<&Tooltip>) -> String {
    let layout = ctx.layout();
    let config = ctx.config();
    let (inner_w, inner_h) = (layout.inner_width(), layout.inner_height());

    let gradient_id = format!("grad-eq-vertical-{}", ctx.chart_id());

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" {font}>"##,
        w = layout.width,
        h = layout.height,
        font = FONT
    ));
    svg.push('\n');

    svg.push_str(&gradient_defs(ctx, state, &gradient_id));

    if let Some(title) = &config.title {
        svg.push_str(&format!(
            r##"<text class="title" x="{:.1}" y="14" text-anchor="middle" font-size="13" font-weight="600">{}</text>"##,
            layout.width / 2.0,
            escape(title)
        ));
        svg.push('\n');
    }

    svg.push_str(&format!(
        r##"<g class="plot" transform="translate({},{})">"##,
        layout.margin.left, layout.margin.top
    ));
    svg.push('\n');
    svg.push_str(&cells(ctx, state));
    svg.push_str(&longitude_axis(ctx, state, inner_w, inner_h));
    svg.push_str(&decade_axis(ctx, state, inner_h));
    svg.push_str(&format!(
        r##"<text class="axis-title" x="{:.1}" y="{:.1}" text-anchor="middle">Longitude</text>"##,
        inner_w / 2.0,
        inner_h + 44.0
    ));
    svg.push_str(&format!(
        r##"<text class="axis-title" transform="rotate(-90)" x="{:.1}" y="-56" text-anchor="middle">Decade</text>"##,
        -inner_h / 2.0
    ));
    svg.push_str("\n</g>\n");

    svg.push_str(&legend_bar(ctx, state, &gradient_id));

    if config.legend_handles {
        svg.push_str(&legend_handles(ctx, state));
    }

    if let Some(tip) = tooltip {
        svg.push_str(&tooltip_box(tip));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Static "no data" message shown when loading fails
pub fn render_empty_state(width: f64, height: f64, message: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" {font}>
<rect class="empty-state" x="0" y="0" width="{w}" height="{h}" fill="#fafafa" stroke="#ccc"/>
<text x="{cx:.1}" y="{cy:.1}" text-anchor="middle" font-size="16" fill="#555">No data available</text>
<text x="{cx:.1}" y="{cy2:.1}" text-anchor="middle" font-size="12" fill="#888">{message}</text>
</svg>
"##,
        w = width,
        h = height,
        font = FONT,
        cx = width / 2.0,
        cy = height / 2.0,
        cy2 = height / 2.0 + 22.0,
        message = escape(message)
    )
}

fn gradient_defs(ctx: &ChartContext, state: &ViewState, gradient_id: &str) -> String {
    let mut defs = format!(
        r##"<defs><linearGradient id="{}" x1="0%" x2="0%" y1="100%" y2="0%">"##,
        gradient_id
    );
    for stop in legend_gradient(&ctx.color_scale(state)) {
        defs.push_str(&format!(
            r##"<stop offset="{:.0}%" stop-color="{}"/>"##,
            stop.offset * 100.0,
            stop.color
        ));
    }
    defs.push_str("</linearGradient></defs>\n");
    defs
}

fn cells(ctx: &ChartContext, state: &ViewState) -> String {
    let x = ctx.x_scale(state);
    let y = ctx.y_scale(state);
    let color = ctx.color_scale(state);
    let (bw, bh) = (x.bandwidth(), y.bandwidth());

    let mut out = String::new();
    for cell in ctx.visible_cells(state) {
        let (Some(px), Some(py)) = (x.position(cell.longitude), y.position(cell.decade)) else {
            continue;
        };
        let opacity = ctx.cell_opacity(state, cell.value);
        let opacity_attr = if opacity < 1.0 {
            format!(r##" fill-opacity="{}""##, opacity)
        } else {
            String::new()
        };
        out.push_str(&format!(
            r##"<rect class="heatmap-cell" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"{}/>"##,
            px,
            py,
            bw,
            bh,
            color.color_hex(cell.value),
            opacity_attr
        ));
        out.push('\n');
    }
    out
}

fn longitude_axis(ctx: &ChartContext, state: &ViewState, inner_w: f64, inner_h: f64) -> String {
    let config = ctx.config();
    let x = ctx.x_scale(state);
    let half = x.bandwidth() / 2.0;

    let mut out = format!(
        r##"<g class="axis axis-x" transform="translate(0,{:.2})"><line x1="0" x2="{:.2}" y1="0" y2="0" stroke="#000"/>"##,
        inner_h, inner_w
    );
    let ticks = longitude_ticks(
        &state.current_longitudes,
        config.lon_tick_step,
        config.lon_max_ticks,
    );
    for lon in ticks {
        let Some(px) = x.position(lon) else { continue };
        out.push_str(&format!(
            r##"<g class="tick" transform="translate({:.2},0)"><line y2="{}" stroke="#000"/><text y="{}" dy="0.71em" text-anchor="middle">{}</text></g>"##,
            px + half,
            TICK_SIZE,
            TICK_SIZE + 3.0,
            degree_label(lon)
        ));
    }
    out.push_str("</g>\n");
    out
}

fn decade_axis(ctx: &ChartContext, state: &ViewState, inner_h: f64) -> String {
    let y = ctx.y_scale(state);
    let half = y.bandwidth() / 2.0;

    let mut out = format!(
        r##"<g class="axis axis-y"><line x1="0" x2="0" y1="0" y2="{:.2}" stroke="#000"/>"##,
        inner_h
    );
    for decade in decade_ticks(&state.current_decades) {
        let Some(py) = y.position(decade) else { continue };
        out.push_str(&format!(
            r##"<g class="tick" transform="translate(0,{:.2})"><line x2="-{}" stroke="#000"/><text x="-{}" dy="0.32em" text-anchor="end">{}</text></g>"##,
            py + half,
            TICK_SIZE,
            TICK_SIZE + 3.0,
            decade
        ));
    }
    out.push_str("</g>\n");
    out
}

fn legend_bar(ctx: &ChartContext, state: &ViewState, gradient_id: &str) -> String {
    let geometry = ctx.legend_geometry();
    let scale = geometry.scale(&state.color);
    let count = ctx.config().legend_ticks;
    let precision = tick_precision(state.color.min, state.color.max, count);
    let axis_x = geometry.x + geometry.width;

    let mut out = format!(
        r##"<g class="legend"><rect x="{:.2}" y="{:.2}" width="{}" height="{:.2}" fill="url(#{})" stroke="#ccc"/>"##,
        geometry.x, geometry.y, geometry.width, geometry.height, gradient_id
    );
    for value in scale.ticks(count) {
        out.push_str(&format!(
            r##"<g class="tick" transform="translate({:.2},{:.2})"><line x2="{}" stroke="#000"/><text x="{}" dy="0.32em">{:.*}</text></g>"##,
            axis_x,
            scale.apply(value),
            TICK_SIZE,
            TICK_SIZE + 3.0,
            precision,
            value
        ));
    }
    out.push_str(&format!(
        r##"<text x="{:.2}" y="{:.2}" text-anchor="end">{}</text></g>"##,
        axis_x + 34.0,
        geometry.y - 6.0,
        LEGEND_TITLE
    ));
    out.push('\n');
    out
}

fn legend_handles(ctx: &ChartContext, state: &ViewState) -> String {
    let geometry = ctx.legend_geometry();
    let scale = geometry.scale(&state.color);
    let window = legend::effective_window(state.legend_window.as_ref(), &state.color)
        .unwrap_or_else(|| LegendWindow::full(&state.color));

    let mut out = String::from(r##"<g class="legend-handles">"##);
    for (handle, value) in [
        (LegendHandle::Top, window.top),
        (LegendHandle::Bottom, window.bottom),
    ] {
        let name = match handle {
            LegendHandle::Top => "top",
            LegendHandle::Bottom => "bottom",
        };
        out.push_str(&format!(
            r##"<rect class="legend-handle" data-handle="{}" x="{:.2}" y="{:.2}" width="{}" height="4" fill="#333"/>"##,
            name,
            geometry.x - 3.0,
            scale.apply(value) - 2.0,
            geometry.width + 6.0
        ));
    }
    out.push_str("</g>\n");
    out
}

fn tooltip_box(tip: &Tooltip) -> String {
    let mut out = format!(
        r##"<g class="tooltip" transform="translate({:.2},{:.2})"><rect width="{}" height="{}" fill="white" stroke="#ccc" rx="4"/><text x="6" y="16" font-size="12">"##,
        tip.anchor.0, tip.anchor.1, TOOLTIP_WIDTH, TOOLTIP_HEIGHT
    );
    for (i, line) in tip.lines.iter().enumerate() {
        out.push_str(&format!(
            r##"<tspan x="6" dy="{}">{}</tspan>"##,
            if i == 0 { 0 } else { 14 },
            escape(line)
        ));
    }
    out.push_str("</text></g>\n");
    out
}

/// Decimals needed to tell ticks apart
fn tick_precision(lo: f64, hi: f64, count: usize) -> usize {
    let step = tick_step(lo, hi, count);
    if step.is_finite() && step > 0.0 {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
