use super::*;
use crate::config::ChartConfig;

#[path = "view_state_property_tests.rs"]
mod view_state_property_tests;

/// Full grid: `n_decades` decades from 1900, `n_lons` longitudes from -180 every 30°
pub(crate) fn grid(n_decades: usize, n_lons: usize) -> GridDataset {
    let mut cells = Vec::new();
    for d in 0..n_decades {
        for l in 0..n_lons {
            let decade = 1900 + 10 * d as i32;
            let lon = -180 + 30 * l as i32;
            cells.push(Cell::new(decade, lon, (d as f64 - l as f64) / 4.0));
        }
    }
    GridDataset::from_cells(cells).expect("grid is valid")
}

pub(crate) fn context(n_decades: usize, n_lons: usize) -> ChartContext {
    ChartContext::new(grid(n_decades, n_lons), ChartConfig::default()).expect("default palette")
}

#[test]
fn seam_cell_exists_after_normalization() {
    let ds = GridDataset::from_cells(vec![Cell::new(1990, -180, 0.5)]).unwrap();
    assert_eq!(ds.get(1990, 180), Some(0.5));
}

#[test]
fn filter_then_zoom_then_reset_sequence() {
    let ctx = context(6, 12);
    let mut state = ctx.initial_state();
    let initial = state.clone();

    let t = dispatch(
        &ctx,
        &state,
        &ChartEvent::RegionFilterChanged {
            filter: RegionFilter::Range { lo: 90, hi: 180 },
        },
    );
    assert!(t.dirty);
    state = t.state;
    assert_eq!(state.current_longitudes, vec![90, 120, 150, 180]);

    let t = dispatch(
        &ctx,
        &state,
        &ChartEvent::BrushEnded {
            selection: Some(PixelRect::new(0.0, 0.0, 300.0, 100.0)),
        },
    );
    assert!(t.dirty);
    state = t.state;
    assert!(state.is_zoomed());
    assert!(state.is_filtered());

    // Reset zoom keeps the filter
    state = dispatch(&ctx, &state, &ChartEvent::ResetZoom).state;
    assert!(!state.is_zoomed());
    assert!(state.is_filtered());

    state = dispatch(&ctx, &state, &ChartEvent::ResetFilters).state;
    assert_eq!(state, initial);
}
