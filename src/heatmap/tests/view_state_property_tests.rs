use proptest::prelude::*;

use super::context;
use crate::heatmap::tooltip;
use crate::heatmap::{dispatch, ChartEvent, PixelRect, RegionFilter, ViewState};

fn filter_strategy() -> impl Strategy<Value = RegionFilter> {
    prop_oneof![
        Just(RegionFilter::All),
        Just(RegionFilter::Range { lo: 0, hi: 90 }),
        Just(RegionFilter::Range { lo: 90, hi: 180 }),
        // Not offered by the default chart
        Just(RegionFilter::Range { lo: -90, hi: 0 }),
    ]
}

fn zoom_event_strategy() -> impl Strategy<Value = ChartEvent> {
    prop_oneof![
        filter_strategy().prop_map(|filter| ChartEvent::RegionFilterChanged { filter }),
        Just(ChartEvent::ResetFilters),
        Just(ChartEvent::BrushStarted),
        (-50.0..900.0f64, -50.0..500.0f64, -50.0..900.0f64, -50.0..500.0f64).prop_map(
            |(x0, y0, x1, y1)| ChartEvent::BrushEnded {
                selection: Some(PixelRect::new(x0, y0, x1, y1)),
            }
        ),
        Just(ChartEvent::BrushEnded { selection: None }),
        (-20.0..850.0f64, -20.0..460.0f64, -3000.0..3000.0f64)
            .prop_map(|(x, y, delta_y)| ChartEvent::Wheel { x, y, delta_y }),
        Just(ChartEvent::DoubleClick),
        Just(ChartEvent::ResetZoom),
    ]
}

fn color_event_strategy() -> impl Strategy<Value = ChartEvent> {
    prop_oneof![
        (-10.0..10.0f64, -10.0..10.0f64)
            .prop_map(|(min, max)| ChartEvent::SetColorRange { min, max }),
        (-10.0..10.0f64).prop_map(|value| ChartEvent::ColorMinInput { value }),
        (-10.0..10.0f64).prop_map(|value| ChartEvent::ColorMaxInput { value }),
        Just(ChartEvent::ResetColorRange),
    ]
}

fn event_strategy() -> impl Strategy<Value = ChartEvent> {
    prop_oneof![3 => zoom_event_strategy(), 1 => color_event_strategy()]
}

fn is_subset(inner: &[i32], outer: &[i32]) -> bool {
    inner.iter().all(|v| outer.contains(v))
}

fn is_sorted(values: &[i32]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

fn replay(ctx: &crate::heatmap::ChartContext, events: &[ChartEvent]) -> ViewState {
    events.iter().fold(ctx.initial_state(), |state, event| dispatch(ctx, &state, event).state)
}

proptest! {
    #[test]
    fn prop_domains_stay_nested(
        n_decades in 2usize..9,
        n_lons in 2usize..13,
        events in prop::collection::vec(event_strategy(), 0..25),
    ) {
        let ctx = context(n_decades, n_lons);
        let mut state = ctx.initial_state();

        for event in &events {
            state = dispatch(&ctx, &state, event).state;

            prop_assert!(!state.current_decades.is_empty());
            prop_assert!(!state.current_longitudes.is_empty());
            prop_assert!(is_sorted(&state.current_decades));
            prop_assert!(is_sorted(&state.current_longitudes));
            prop_assert!(is_subset(&state.current_decades, &state.filtered_decades));
            prop_assert!(is_subset(&state.current_longitudes, &state.filtered_longitudes));
            prop_assert!(is_subset(&state.filtered_decades, ctx.dataset().decades()));
            prop_assert!(is_subset(&state.filtered_longitudes, ctx.dataset().longitudes()));
            prop_assert!(state.color.min < state.color.max);
        }
    }

    #[test]
    fn prop_resets_restore_initial_domain(
        events in prop::collection::vec(event_strategy(), 0..25),
    ) {
        let ctx = context(6, 12);
        let initial = ctx.initial_state();
        let mut state = replay(&ctx, &events);

        state = dispatch(&ctx, &state, &ChartEvent::ResetZoom).state;
        state = dispatch(&ctx, &state, &ChartEvent::ResetFilters).state;

        prop_assert_eq!(&state.current_decades, &initial.current_decades);
        prop_assert_eq!(&state.current_longitudes, &initial.current_longitudes);
        prop_assert_eq!(state.region_filter, RegionFilter::All);
    }

    #[test]
    fn prop_small_brush_never_zooms(
        events in prop::collection::vec(event_strategy(), 0..10),
        x0 in 0.0..830.0f64,
        y0 in 0.0..440.0f64,
        small in 0.0..9.99f64,
        large in 0.0..440.0f64,
        narrow_in_x in any::<bool>(),
    ) {
        let ctx = context(6, 12);
        let state = replay(&ctx, &events);

        let selection = if narrow_in_x {
            PixelRect::new(x0, y0, x0 + small, y0 + large)
        } else {
            PixelRect::new(x0, y0, x0 + large, y0 + small)
        };
        let t = dispatch(&ctx, &state, &ChartEvent::BrushEnded { selection: Some(selection) });

        prop_assert!(!t.dirty);
        prop_assert_eq!(&t.state.current_decades, &state.current_decades);
        prop_assert_eq!(&t.state.current_longitudes, &state.current_longitudes);
    }

    #[test]
    fn prop_wheel_window_bounds(
        n_decades in 2usize..9,
        n_lons in 2usize..13,
        events in prop::collection::vec(event_strategy(), 0..10),
        x in 0.0..830.0f64,
        y in 0.0..440.0f64,
        delta_y in -5000.0..5000.0f64,
    ) {
        let ctx = context(n_decades, n_lons);
        let mut state = replay(&ctx, &events);
        state.brush_active = false;

        let next = dispatch(&ctx, &state, &ChartEvent::Wheel { x, y, delta_y }).state;

        for (current, filtered) in [
            (&next.current_decades, &next.filtered_decades),
            (&next.current_longitudes, &next.filtered_longitudes),
        ] {
            prop_assert!(current.len() >= 2usize.min(filtered.len()));
            prop_assert!(current.len() <= filtered.len());
        }
        prop_assert!(next.current_decades.len() <= ctx.dataset().decades().len());
        prop_assert!(next.current_longitudes.len() <= ctx.dataset().longitudes().len());
    }

    #[test]
    fn prop_set_color_range_keeps_order(
        events in prop::collection::vec(event_strategy(), 0..10),
        min in -100.0..100.0f64,
        max in -100.0..100.0f64,
    ) {
        let ctx = context(4, 6);
        let state = replay(&ctx, &events);
        let next = dispatch(&ctx, &state, &ChartEvent::SetColorRange { min, max }).state;
        prop_assert!(next.color.min < next.color.max);
    }

    #[test]
    fn prop_hover_outside_plot_has_no_tooltip(
        events in prop::collection::vec(event_strategy(), 0..10),
        x in -500.0..1500.0f64,
        y in -500.0..1000.0f64,
    ) {
        let ctx = context(6, 12);
        let state = replay(&ctx, &events);
        let layout = ctx.layout();
        prop_assume!(!layout.contains_inner(x, y));
        prop_assert!(tooltip::resolve(&ctx, &state, x, y).is_none());
    }
}
