//! Interactive decade × longitude anomaly heatmap
//!
//! Structure:
//! - `chart_properties.rs`: chart.json property registry and typed reader
//! - `data.rs` / `loader.rs`: grid dataset and CSV loading
//! - `scales.rs`, `colors.rs`, `palettes.rs`, `axis.rs`: scale building
//! - `view_state.rs` / `events.rs`: view state, operations and dispatch
//! - `tooltip.rs` / `legend.rs`: hover resolution and legend handles

pub mod axis;
pub mod chart_properties;
pub mod colors;
pub mod data;
pub mod error;
pub mod events;
pub mod legend;
pub mod loader;
pub mod palettes;
pub mod scales;
pub mod tooltip;
pub mod view_state;

#[cfg(test)]
mod tests;

pub use data::{Cell, GridDataset};
pub use error::{HeatmapError, Result};
pub use events::{dispatch, ChartEvent, HeatmapController, Transition};
pub use view_state::{ChartContext, PixelRect, RegionFilter, ViewState};
