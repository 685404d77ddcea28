//! Render surfaces
//!
//! Rendering reads a `ViewState` and never changes it.

pub mod svg;

pub use svg::{render_chart, render_empty_state};
