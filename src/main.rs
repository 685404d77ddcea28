//! Anomaly heatmap - command-line entry point
//!
//! Loads a decade × longitude anomaly CSV, replays a scripted sequence of
//! interaction events and writes the resulting chart as SVG.

use anomaly_heatmap::config::ChartConfig;
use anomaly_heatmap::pipeline::{self, RunOptions};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anomaly_heatmap")]
#[command(about = "Interactive decade x longitude temperature anomaly heatmap", version)]
struct Cli {
    /// CSV resource (overrides the data.path property)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Flat JSON object of chart properties
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart property override, e.g. --set legend.handles=true
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// JSON array of interaction events to replay
    #[arg(long)]
    events: Option<PathBuf>,

    /// Pointer position in plot coordinates for the tooltip
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    hover: Option<(f64, f64)>,

    /// Output SVG file
    #[arg(long, default_value = "heatmap.svg")]
    out: PathBuf,

    /// Write one SVG per redraw into this directory
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Print the final view state as JSON
    #[arg(long)]
    inspect: bool,
}

fn parse_point(s: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    log::info!("anomaly_heatmap v{}", env!("CARGO_PKG_VERSION"));

    let mut props = pipeline::load_properties(cli.config.as_deref(), &cli.overrides).await?;
    if let Some(data) = &cli.data {
        props.set("data.path", data.to_string_lossy().to_string());
    }
    let config = ChartConfig::from_properties(&props);
    log::debug!("Config: {:?}", config);

    let events = match &cli.events {
        Some(path) => pipeline::load_events(path).await?,
        None => Vec::new(),
    };

    if let Some(dir) = &cli.snapshots {
        if dir == &cli.out {
            bail!("--snapshots must be a directory, not the output file");
        }
    }

    let output = pipeline::run(RunOptions {
        config,
        events,
        hover: cli.hover,
        snapshot_dir: cli.snapshots,
    })
    .await?;

    tokio::fs::write(&cli.out, &output.svg)
        .await
        .with_context(|| format!("writing {}", cli.out.display()))?;
    log::info!(
        "Wrote {} ({} redraw(s), {} snapshot(s))",
        cli.out.display(),
        output.redraws,
        output.snapshots.len()
    );

    if let Some(err) = &output.load_error {
        bail!("{}", err);
    }

    if cli.inspect {
        let json = serde_json::json!({
            "emptyState": output.is_empty_state(),
            "state": output.state,
            "tooltip": output.tooltip,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    Ok(())
}
