use thiserror::Error;

/// Errors that can occur while loading or preparing a heatmap
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// Resource could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or column conversion failed
    #[error("CSV error: {0}")]
    Csv(#[from] polars::error::PolarsError),

    /// JSON parsing failed (config files, event scripts)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from the resource
    #[error("Missing column '{name}' (looked for: {candidates})")]
    MissingColumn { name: String, candidates: String },

    /// The resource was read but yielded no usable rows
    #[error("No data: {0}")]
    EmptyResource(String),

    /// Two source rows map to the same grid position
    #[error("Duplicate cell at decade {decade}, longitude {longitude}")]
    DuplicateCell { decade: i32, longitude: i32 },

    /// Configuration error (invalid property values, unknown palette, ...)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HeatmapError {
    /// Whether this error should be shown as the static "no data" fallback
    pub fn is_empty_resource(&self) -> bool {
        matches!(self, HeatmapError::EmptyResource(_))
    }
}

/// Type alias for Results using HeatmapError
pub type Result<T> = std::result::Result<T, HeatmapError>;
