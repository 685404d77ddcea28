//! Anomaly Heatmap Library
//!
//! Decade × longitude temperature anomaly heatmap: CSV loading, scales,
//! the view-state controller with its interaction events, and SVG rendering.

pub mod config;
pub mod heatmap;
pub mod pipeline;
pub mod render;
