//! Chart pipeline shared by the CLI and tests
//!
//! The pipeline:
//! 1. Loads the CSV resource (the only asynchronous step)
//! 2. Builds the chart context and its initial view state
//! 3. Replays interaction events, writing a snapshot after each redraw
//! 4. Renders the final view (with an optional hover tooltip)
//!
//! A failed load always renders the static "no data" chart. An empty resource
//! ends there; any other failure is also reported through `RunOutput::load_error`
//! so the caller can exit with an error.

use crate::config::ChartConfig;
use crate::heatmap::chart_properties::ChartPropertyReader;
use crate::heatmap::events::parse_script;
use crate::heatmap::loader::load_grid;
use crate::heatmap::tooltip::Tooltip;
use crate::heatmap::{ChartContext, ChartEvent, HeatmapController, ViewState};
use crate::render::{render_chart, render_empty_state};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// What to do with a loaded chart
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: ChartConfig,
    pub events: Vec<ChartEvent>,
    /// Pointer position (plot coordinates) for the final tooltip
    pub hover: Option<(f64, f64)>,
    /// Directory for one SVG per redraw
    pub snapshot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub svg: String,
    /// Final view state; None when the resource had no data
    pub state: Option<ViewState>,
    pub tooltip: Option<Tooltip>,
    /// Events that required a redraw
    pub redraws: usize,
    pub snapshots: Vec<PathBuf>,
    /// Set when the resource could not be loaded for a reason other than having no data
    pub load_error: Option<String>,
}

impl RunOutput {
    pub fn is_empty_state(&self) -> bool {
        self.state.is_none()
    }
}

/// Read chart properties from an optional flat JSON file plus `key=value` overrides
pub async fn load_properties(
    config_path: Option<&Path>,
    overrides: &[String],
) -> Result<ChartPropertyReader> {
    let mut props = match config_path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading chart config {}", path.display()))?;
            ChartPropertyReader::from_json_str(&json)
                .with_context(|| format!("parsing chart config {}", path.display()))?
        }
        None => ChartPropertyReader::new(),
    };

    for assignment in overrides {
        props.apply_override(assignment)?;
    }
    Ok(props)
}

/// Read an event script (JSON array of events)
pub async fn load_events(path: &Path) -> Result<Vec<ChartEvent>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading event script {}", path.display()))?;
    let events = parse_script(&json)
        .with_context(|| format!("parsing event script {}", path.display()))?;
    log::info!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}

/// Load, replay and render one chart
pub async fn run(options: RunOptions) -> Result<RunOutput> {
    let config = options.config;
    let t0 = std::time::Instant::now();

    log::info!("[1/3] Loading {}", config.data_path.display());
    let dataset = match load_grid(&config.data_path, config.value_column.as_deref()).await {
        Ok(dataset) => dataset,
        Err(e) => {
            let message = e.to_string();
            let load_error = if e.is_empty_resource() {
                log::warn!("{}; rendering the empty state", message);
                None
            } else {
                log::error!("Loading {} failed: {}", config.data_path.display(), message);
                Some(format!("loading {}: {}", config.data_path.display(), message))
            };
            let svg = render_empty_state(config.layout.width, config.layout.height, &message);
            return Ok(RunOutput {
                svg,
                state: None,
                tooltip: None,
                redraws: 0,
                snapshots: Vec::new(),
                load_error,
            });
        }
    };
    log::info!(
        "  {} cells, {} decades, {} longitudes, values {:?} ({:.1?})",
        dataset.len(),
        dataset.decades().len(),
        dataset.longitudes().len(),
        dataset.value_extent(),
        t0.elapsed()
    );

    let ctx = ChartContext::new(dataset, config)?;
    let mut controller = HeatmapController::new(ctx);

    if let Some(dir) = &options.snapshot_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }

    log::info!("[2/3] Replaying {} event(s)", options.events.len());
    let mut redraws = 0;
    let mut snapshots = Vec::new();
    for (i, event) in options.events.iter().enumerate() {
        if !controller.handle(event) {
            log::debug!("  #{} {}: no change", i, event.name());
            continue;
        }
        redraws += 1;

        let state = controller.state();
        log::info!(
            "  #{} {}: {} decades x {} longitudes, filter {}, color [{:.2}, {:.2}]",
            i,
            event.name(),
            state.current_decades.len(),
            state.current_longitudes.len(),
            state.region_filter,
            state.color.min,
            state.color.max
        );

        if let Some(dir) = &options.snapshot_dir {
            let path = dir.join(format!("{:03}-{}.svg", i, event.name()));
            let svg = render_chart(controller.context(), state, None);
            tokio::fs::write(&path, svg)
                .await
                .with_context(|| format!("writing snapshot {}", path.display()))?;
            snapshots.push(path);
        }
    }

    log::info!("[3/3] Rendering");
    let tooltip = options.hover.and_then(|(x, y)| controller.tooltip(x, y));
    if let Some((x, y)) = options.hover {
        match &tooltip {
            Some(tip) => log::info!("  hover ({}, {}): {}", x, y, tip.lines.join(" / ")),
            None => log::info!("  hover ({}, {}): no tooltip", x, y),
        }
    }
    let svg = render_chart(controller.context(), controller.state(), tooltip.as_ref());
    log::info!("Done in {:.1?}", t0.elapsed());

    Ok(RunOutput {
        svg,
        state: Some(controller.state().clone()),
        tooltip,
        redraws,
        snapshots,
        load_error: None,
    })
}
